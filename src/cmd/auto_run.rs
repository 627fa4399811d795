//! Background loop commands: `folio auto-run start|stop`.

use anyhow::Result;

use folio::config::Config;

use super::super::AutoRunCommands;
use super::controller;

pub fn cmd_auto_run(config: &Config, command: AutoRunCommands) -> Result<()> {
    let ctl = controller(config);
    match command {
        AutoRunCommands::Start { project } => {
            let record = ctl.start_auto_run(&project)?;
            match record.auto_run_pid {
                Some(pid) => println!("Auto-run on for {} (pid {})", project, pid),
                None => println!("Auto-run on for {}", project),
            }
        }
        AutoRunCommands::Stop { project } => {
            ctl.stop_auto_run(&project)?;
            println!("Auto-run off for {}", project);
        }
    }
    Ok(())
}
