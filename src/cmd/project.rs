//! Project listing and status commands.

use anyhow::Result;
use console::style;

use folio::config::Config;
use folio::state::StateRecord;

use super::controller;

pub fn cmd_projects(config: &Config) {
    let ctl = controller(config);
    let projects = ctl.list_projects();

    if projects.is_empty() {
        println!();
        println!("No projects found in {}", config.projects_dir.display());
        println!();
        return;
    }

    println!();
    println!("{:<24} {:<16} Tasks", "Project", "State");
    println!("{:<24} {:<16} -----", "------------------------", "----------------");
    for name in &projects {
        let phase = ctl
            .state(name)
            .ok()
            .and_then(|r| r.state)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let tasks = ctl
            .tasks(name)
            .map(|t| format!("{}/{}", t.done, t.total))
            .unwrap_or_else(|_| "-".to_string());
        println!("{:<24} {:<16} {}", name, phase, tasks);
    }
    println!();
}

pub fn cmd_status(config: &Config, project: &str) -> Result<()> {
    let ctl = controller(config);
    let record = ctl.state(project)?;
    let tasks = ctl.tasks(project)?;
    let review = ctl.review(project)?;

    println!();
    println!("{}", style(project).bold());
    print_record(&record);

    println!();
    println!("Tasks: {}/{} done", tasks.done, tasks.total);
    for task in &tasks.items {
        println!(
            "  {:<10} {:<10} {}",
            task.id,
            style(&task.status).dim(),
            task.title
        );
    }

    if !review.items.is_empty() {
        println!();
        println!("Review items:");
        for item in &review.items {
            println!("  {}", item);
        }
    }
    println!();
    Ok(())
}

pub(super) fn print_record(record: &StateRecord) {
    let phase = record
        .state
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("  state:        {}", style(phase).cyan());
    if let Some(role) = &record.role {
        println!("  role:         {}", role);
    }
    if let Some(run_id) = &record.run_id {
        println!("  run_id:       {}", run_id);
    }
    if let Some(updated) = record.updated_at {
        println!("  updated_at:   {}", format_epoch(updated));
    }
    println!("  interactive:  {}", record.is_interactive());
    if let Some(resume) = &record.resume_state {
        println!("  resume_state: {}", resume);
    }
    match (record.auto_run, record.auto_run_pid) {
        (Some(true), Some(pid)) => println!("  auto_run:     on (pid {})", pid),
        (Some(true), None) => println!("  auto_run:     on"),
        _ => println!("  auto_run:     off"),
    }
}

fn format_epoch(secs: f64) -> String {
    chrono::DateTime::from_timestamp_millis((secs * 1000.0) as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{}", secs))
}
