//! Configuration view and init commands: `folio config`.

use anyhow::Result;

use folio::config::{CONFIG_FILE_NAME, Config, FolioConfig};

use super::super::ConfigCommands;

pub fn cmd_config(config: &Config, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = config.base_dir.join(CONFIG_FILE_NAME);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Folio Configuration");
            println!("===================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found at {}", CONFIG_FILE_NAME, config_path.display());
                println!("Run 'folio config init' to create one.");
            }
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  host = \"{}\"", config.host);
            println!("  port = {}", config.port);
            println!("  projects_dir = \"{}\"", config.projects_dir.display());
            println!("  worker.command = \"{}\"", config.worker_command);
            if !config.worker_args.is_empty() {
                println!("  worker.args = {:?}", config.worker_args);
            }
            println!("  auto_run.interval_secs = {}", config.auto_run_interval_secs);
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE_NAME, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            FolioConfig::default().save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE_NAME, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] host, port");
            println!("  - [projects] dir");
            println!("  - [worker] command, args");
            println!("  - [auto_run] interval_secs");
            println!();
        }
    }

    Ok(())
}
