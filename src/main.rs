use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use folio::config::Config;

mod cmd;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Control plane for file-backed agentic writing projects")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding folio.toml and the worker script (defaults to the current directory)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Override the projects directory from folio.toml / FOLIO_PROJECTS_DIR
    #[arg(long, global = true)]
    pub projects_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the dashboard and JSON API
    Serve {
        /// Port to serve on (overrides folio.toml / STATUS_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Enable dev mode (permissive CORS for a separately served UI)
        #[arg(long)]
        dev: bool,

        /// Open the dashboard in a browser once listening
        #[arg(long)]
        open: bool,
    },
    /// List projects
    Projects,
    /// Show a project's state, tasks and review items
    Status { project: String },
    /// Force a project into PAUSED
    Pause { project: String },
    /// Force a project into INTAKE_READY
    Resume { project: String },
    /// Trigger a single worker run
    Run { project: String },
    /// Save intake answers and move to INTAKE_READY
    Intake {
        project: String,
        /// File with the answers (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Ask the worker to pause at its next checkpoint
    Interrupt { project: String },
    /// Continue after an interrupt pause
    Continue { project: String },
    /// Approve the pending review and return to DEV_READY
    ReviewContinue { project: String },
    /// Switch interactive mode on or off
    Interactive { project: String, mode: Toggle },
    /// Start or stop the background auto-run loop
    AutoRun {
        #[command(subcommand)]
        command: AutoRunCommands,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand, Clone)]
pub enum AutoRunCommands {
    Start { project: String },
    Stop { project: String },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default folio.toml
    Init,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "folio=debug" } else { "folio=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let base_dir = match cli.base_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let mut config = Config::resolve(&base_dir)?;
    if let Some(dir) = &cli.projects_dir {
        config.projects_dir = dir.clone();
    }

    match &cli.command {
        Commands::Serve {
            port,
            host,
            dev,
            open,
        } => {
            cmd::cmd_serve(&config, *port, host.clone(), *dev, *open).await?;
        }
        Commands::Projects => cmd::cmd_projects(&config),
        Commands::Status { project } => cmd::cmd_status(&config, project)?,
        Commands::Pause { project } => cmd::cmd_pause(&config, project)?,
        Commands::Resume { project } => cmd::cmd_resume(&config, project)?,
        Commands::Run { project } => cmd::cmd_run(&config, project)?,
        Commands::Intake { project, file } => cmd::cmd_intake(&config, project, file.as_deref())?,
        Commands::Interrupt { project } => cmd::cmd_interrupt(&config, project)?,
        Commands::Continue { project } => cmd::cmd_continue(&config, project)?,
        Commands::ReviewContinue { project } => cmd::cmd_review_continue(&config, project)?,
        Commands::Interactive { project, mode } => {
            cmd::cmd_interactive(&config, project, matches!(mode, Toggle::On))?
        }
        Commands::AutoRun { command } => cmd::cmd_auto_run(&config, command.clone())?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
