//! Layered configuration for Folio.
//!
//! Settings come from an optional `folio.toml` in the base directory, then
//! environment variables, then CLI flags (applied by the binary).
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8787
//!
//! [projects]
//! dir = "projects"
//!
//! [worker]
//! command = "./tick.sh"
//! args = []
//!
//! [auto_run]
//! interval_secs = 20
//! ```
//!
//! | Variable             | Overrides            |
//! |----------------------|----------------------|
//! | `FOLIO_PROJECTS_DIR` | `projects.dir`       |
//! | `STATUS_PORT`        | `server.port`        |
//! | `FOLIO_WORKER_CMD`   | `worker.command`     |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "folio.toml";

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where project directories live. Relative paths resolve against the base dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsSection {
    #[serde(default = "default_projects_dir")]
    pub dir: PathBuf,
}

fn default_projects_dir() -> PathBuf {
    PathBuf::from("projects")
}

impl Default for ProjectsSection {
    fn default() -> Self {
        Self {
            dir: default_projects_dir(),
        }
    }
}

/// The external worker ("tick"). Invoked as `<command> <args...> <project>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSection {
    #[serde(default = "default_worker_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_worker_command() -> String {
    "./tick.sh".to_string()
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            command: default_worker_command(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoRunSection {
    /// Pause between worker invocations in the background loop
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    20
}

impl Default for AutoRunSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Contents of `folio.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub projects: ProjectsSection,
    #[serde(default)]
    pub worker: WorkerSection,
    #[serde(default)]
    pub auto_run: AutoRunSection,
}

impl FolioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse folio.toml")
    }

    /// Load `folio.toml` from `base_dir`, falling back to defaults when absent.
    pub fn load_or_default(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize folio.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("FOLIO_PROJECTS_DIR") {
            self.projects.dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup("STATUS_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid STATUS_PORT '{}'", port))?;
        }
        if let Some(cmd) = lookup("FOLIO_WORKER_CMD") {
            self.worker.command = cmd;
        }
        Ok(())
    }
}

/// Effective runtime configuration with every path resolved.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub projects_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub worker_command: String,
    pub worker_args: Vec<String>,
    pub auto_run_interval_secs: u64,
}

impl Config {
    /// Resolve `folio.toml` + environment for `base_dir`.
    pub fn resolve(base_dir: &Path) -> Result<Self> {
        let mut file = FolioConfig::load_or_default(base_dir)?;
        file.apply_env()?;
        Ok(Self::from_file(base_dir, file))
    }

    pub fn from_file(base_dir: &Path, file: FolioConfig) -> Self {
        let projects_dir = if file.projects.dir.is_absolute() {
            file.projects.dir
        } else {
            base_dir.join(file.projects.dir)
        };
        Self {
            base_dir: base_dir.to_path_buf(),
            projects_dir,
            host: file.server.host,
            port: file.server.port,
            worker_command: file.worker.command,
            worker_args: file.worker.args,
            auto_run_interval_secs: file.auto_run.interval_secs,
        }
    }
}
