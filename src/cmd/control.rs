//! State transition commands: pause, resume, run, intake, interrupt,
//! continue, review-continue and interactive.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use folio::config::Config;
use folio::state::StateRecord;

use super::controller;
use super::project::print_record;

fn report(project: &str, action: &str, record: &StateRecord) {
    println!();
    println!("{} {}", style(action).green().bold(), project);
    print_record(record);
    println!();
}

pub fn cmd_pause(config: &Config, project: &str) -> Result<()> {
    let record = controller(config).pause(project)?;
    report(project, "Paused", &record);
    Ok(())
}

pub fn cmd_resume(config: &Config, project: &str) -> Result<()> {
    let record = controller(config).resume(project)?;
    report(project, "Resumed", &record);
    Ok(())
}

pub fn cmd_run(config: &Config, project: &str) -> Result<()> {
    let triggered = controller(config).trigger_run(project)?;
    println!(
        "Triggered worker run for {} (pid {})",
        triggered.project, triggered.pid
    );
    Ok(())
}

pub fn cmd_intake(config: &Config, project: &str, file: Option<&Path>) -> Result<()> {
    let answers = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read answers from stdin")?;
            buf
        }
    };
    let record = controller(config).submit_intake(project, &answers)?;
    report(project, "Intake saved for", &record);
    Ok(())
}

pub fn cmd_interrupt(config: &Config, project: &str) -> Result<()> {
    let record = controller(config).request_interrupt(project)?;
    report(project, "Interrupt requested for", &record);
    Ok(())
}

pub fn cmd_continue(config: &Config, project: &str) -> Result<()> {
    let record = controller(config).continue_after_interrupt(project)?;
    report(project, "Continued", &record);
    Ok(())
}

pub fn cmd_review_continue(config: &Config, project: &str) -> Result<()> {
    let record = controller(config).continue_after_review(project)?;
    report(project, "Review approved for", &record);
    Ok(())
}

pub fn cmd_interactive(config: &Config, project: &str, on: bool) -> Result<()> {
    let view = controller(config).update_interaction(project, None, Some(on))?;
    println!(
        "Interactive mode {} for {} (state: {})",
        if on { "on" } else { "off" },
        project,
        view.state.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
    );
    Ok(())
}
