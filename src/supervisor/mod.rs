//! Auto-run supervisor: the detached background loop that keeps invoking
//! the external worker for a project.
//!
//! The loop is an OS process outside the server's lifetime. Its process id
//! is recorded in the state record (`auto_run_pid`) and is the only handle
//! the supervisor keeps. Liveness is never checked: a recorded pid means
//! "started and not yet stopped", nothing more.

mod launcher;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub use launcher::{ProcessLauncher, ShellLauncher, WorkerInvocation};

use crate::config::Config;
use crate::errors::ControlError;
use crate::project::Project;
use crate::state::{StateRecord, StateStore, StateUpdate};

/// How to invoke the external worker for a given project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl WorkerCommand {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.worker_command.clone(),
            args: config.worker_args.clone(),
            cwd: config.base_dir.clone(),
        }
    }

    /// The invocation for `project`: configured args followed by the project name.
    pub fn for_project(&self, project: &Project) -> WorkerInvocation {
        let mut args = self.args.clone();
        args.push(project.name().to_string());
        WorkerInvocation {
            program: self.program.clone(),
            args,
            cwd: self.cwd.clone(),
        }
    }
}

pub struct Supervisor {
    launcher: Arc<dyn ProcessLauncher>,
    worker: WorkerCommand,
    interval: Duration,
}

impl Supervisor {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, worker: WorkerCommand, interval: Duration) -> Self {
        Self {
            launcher,
            worker,
            interval,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(ShellLauncher),
            WorkerCommand::from_config(config),
            Duration::from_secs(config.auto_run_interval_secs),
        )
    }

    /// Start the background loop unless one is already recorded.
    pub fn start(&self, project: &Project, store: &StateStore) -> Result<StateRecord, ControlError> {
        let current = store.read();
        if let Some(pid) = current.auto_run_pid {
            tracing::debug!(project = project.name(), pid, "auto-run already recorded, not starting another loop");
            return Ok(current);
        }

        let invocation = self.worker.for_project(project);
        let pid = self
            .launcher
            .spawn_loop(&invocation, self.interval)
            .map_err(ControlError::SpawnFailed)?;
        tracing::info!(project = project.name(), pid, interval_secs = self.interval.as_secs(), "auto-run loop started");

        store.merge(&StateUpdate::new().auto_run(true, Some(pid)))
    }

    /// Signal the recorded loop's process group and clear the record.
    ///
    /// Signal failures (typically a loop that already exited) are logged and
    /// otherwise ignored; the record is cleared either way.
    pub fn stop(&self, project: &Project, store: &StateStore) -> Result<StateRecord, ControlError> {
        if let Some(pid) = store.read().auto_run_pid {
            match self.launcher.terminate_group(pid) {
                Ok(()) => tracing::info!(project = project.name(), pid, "auto-run loop stopped"),
                Err(e) => tracing::warn!(project = project.name(), pid, error = %e, "failed to signal auto-run loop"),
            }
        }
        store.merge(&StateUpdate::new().auto_run(false, None))
    }

    /// Fire one worker invocation without waiting for it.
    pub fn run_once(&self, project: &Project) -> Result<u32, ControlError> {
        let invocation = self.worker.for_project(project);
        let pid = self
            .launcher
            .spawn_once(&invocation)
            .map_err(ControlError::SpawnFailed)?;
        tracing::info!(project = project.name(), pid, "single worker run triggered");
        Ok(pid)
    }
}
