//! Project state controller.
//!
//! ## Phase machine
//!
//! ```text
//!            pause (any)                 resume / submit intake (any)
//!   * ─────────────────> PAUSED    * ─────────────────────────────> INTAKE_READY
//!
//!   DEV_READY ──(worker)──> RUNNING ──(worker)──> REVIEW_READY / REVIEW_WAITING
//!       ^                                               │
//!       └──────────── continue after review ────────────┘
//!
//!   X (not RUNNING) ── request interrupt ──> PAUSE_INTERACT ── continue ──> X
//!   RUNNING ── request interrupt ──> (flag only; worker pauses itself)
//! ```
//!
//! Transitions are unconditional and last-write-wins: an operator can always
//! force a project back to a known phase. `RUNNING` and the review phases are
//! entered only by the worker writing the state record directly.
//!
//! Every transition is a single [`StateStore::merge`].

mod views;

use std::path::{Path, PathBuf};

pub use views::{ContentFile, EventTail, IntakeView, InteractionView, ReviewView, RunTriggered};

use crate::errors::ControlError;
use crate::guard;
use crate::interrupt::InterruptFlag;
use crate::project::{self, Project, REVIEW_FOLDERS};
use crate::state::{Field, Phase, StateRecord, StateStore, StateUpdate, now_epoch};
use crate::supervisor::Supervisor;
use crate::tail::{self, LogTail};
use crate::tasks::{self, TaskLedger};

pub struct ProjectController {
    projects_dir: PathBuf,
    supervisor: Supervisor,
}

impl ProjectController {
    pub fn new(projects_dir: PathBuf, supervisor: Supervisor) -> Self {
        Self {
            projects_dir,
            supervisor,
        }
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    pub fn list_projects(&self) -> Vec<String> {
        project::list_projects(&self.projects_dir)
    }

    fn open(&self, name: &str) -> Result<(Project, StateStore), ControlError> {
        let project = Project::open(&self.projects_dir, name)?;
        let store = StateStore::new(project.state_file());
        Ok((project, store))
    }

    // ── Read-only views ───────────────────────────────────────────────

    pub fn state(&self, name: &str) -> Result<StateRecord, ControlError> {
        let (_, store) = self.open(name)?;
        Ok(store.read())
    }

    pub fn tasks(&self, name: &str) -> Result<TaskLedger, ControlError> {
        let (project, _) = self.open(name)?;
        Ok(tasks::read_ledger(&project.tasks_file()))
    }

    pub fn logs(&self, name: &str, tail: i64) -> Result<LogTail, ControlError> {
        let (project, _) = self.open(name)?;
        Ok(tail::read_log_tail(&project.logs_dir(), tail))
    }

    pub fn events(&self, name: &str, tail: i64) -> Result<EventTail, ControlError> {
        let (project, _) = self.open(name)?;
        let events = if project.events_file().exists() {
            tail::read_events(&project.events_file(), tail)
        } else {
            Vec::new()
        };
        Ok(EventTail { tail, events })
    }

    pub fn intake(&self, name: &str) -> Result<IntakeView, ControlError> {
        let (project, _) = self.open(name)?;
        Ok(IntakeView {
            questions: read_text_or_empty(&project.intake_questions_file()),
            answers: read_text_or_empty(&project.intake_answers_file()),
        })
    }

    pub fn interaction(&self, name: &str) -> Result<InteractionView, ControlError> {
        let (project, store) = self.open(name)?;
        Ok(interaction_view(&project, &store.read()))
    }

    /// Current phase and pending review items. When the record has no
    /// explicit list, every markdown file under the review folders is listed.
    pub fn review(&self, name: &str) -> Result<ReviewView, ControlError> {
        let (project, store) = self.open(name)?;
        let record = store.read();
        let items = match record.review_items {
            Some(items) => items,
            None => discover_review_items(project.root()),
        };
        Ok(ReviewView {
            state: record.state,
            items,
        })
    }

    pub fn file(&self, name: &str, path: &str) -> Result<ContentFile, ControlError> {
        let (project, _) = self.open(name)?;
        let content = guard::read_content(project.root(), path)?;
        Ok(ContentFile {
            path: path.to_string(),
            content,
        })
    }

    // ── Transitions ───────────────────────────────────────────────────

    /// Any phase → `PAUSED`.
    pub fn pause(&self, name: &str) -> Result<StateRecord, ControlError> {
        let (project, store) = self.open(name)?;
        transition(&project, &store, idle_in(Phase::Paused))
    }

    /// Any phase → `INTAKE_READY`. Deliberately unguarded, like `pause`.
    pub fn resume(&self, name: &str) -> Result<StateRecord, ControlError> {
        let (project, store) = self.open(name)?;
        transition(&project, &store, idle_in(Phase::IntakeReady))
    }

    /// Save intake answers, then transition exactly as [`Self::resume`].
    pub fn submit_intake(&self, name: &str, answers: &str) -> Result<StateRecord, ControlError> {
        let (project, store) = self.open(name)?;
        write_note(&project.intake_answers_file(), answers)?;
        transition(&project, &store, idle_in(Phase::IntakeReady))
    }

    /// Persist interaction notes and/or change the interactive mode.
    pub fn update_interaction(
        &self,
        name: &str,
        notes: Option<&str>,
        interactive_mode: Option<bool>,
    ) -> Result<InteractionView, ControlError> {
        let (project, store) = self.open(name)?;
        if let Some(notes) = notes {
            write_note(&project.interaction_file(), notes)?;
        }
        let record = match interactive_mode {
            Some(mode) => self.set_interactive(&project, &store, mode)?,
            None => store.read(),
        };
        Ok(interaction_view(&project, &record))
    }

    /// Switch between human-steered and autonomous operation.
    ///
    /// Going autonomous from a review or interrupt hold forces the project
    /// back to `DEV_READY`; either way the auto-run loop is started. Going
    /// interactive stops the loop regardless of phase.
    pub fn set_interactive(
        &self,
        project: &Project,
        store: &StateStore,
        interactive: bool,
    ) -> Result<StateRecord, ControlError> {
        if interactive {
            store.merge(&StateUpdate::new().interactive(true))?;
            tracing::info!(project = project.name(), "interactive mode on");
            return self.supervisor.stop(project, store);
        }

        let current = store.read();
        let held = current
            .state
            .as_ref()
            .is_some_and(Phase::is_interactive_hold);
        let update = if held {
            idle_in(Phase::DevReady)
                .interactive(false)
                .resume_state(Field::Clear)
        } else {
            StateUpdate::new().interactive(false)
        };
        let record = store.merge(&update)?;
        tracing::info!(project = project.name(), state = ?record.state, "interactive mode off");
        self.supervisor.start(project, store)
    }

    /// Ask the worker to pause at its next checkpoint.
    ///
    /// The flag is always written. If the worker is not mid-run the phase
    /// moves to `PAUSE_INTERACT` right away, remembering where to return;
    /// a `RUNNING` worker is left to acknowledge the flag itself.
    pub fn request_interrupt(&self, name: &str) -> Result<StateRecord, ControlError> {
        let (project, store) = self.open(name)?;
        InterruptFlag::new(project.interrupt_flag()).request()?;

        let current = store.read();
        if current.state == Some(Phase::Running) {
            tracing::info!(project = project.name(), "interrupt requested, waiting for running worker");
            return Ok(current);
        }

        let resume = Field::Set(current.state.unwrap_or(Phase::DevReady));
        let update = StateUpdate {
            updated_at: Some(now_epoch()),
            ..StateUpdate::new().phase(Phase::PauseInteract).resume_state(resume)
        };
        transition(&project, &store, update)
    }

    /// Leave an interrupt hold: return to the saved phase and drop the flag.
    pub fn continue_after_interrupt(&self, name: &str) -> Result<StateRecord, ControlError> {
        let (project, store) = self.open(name)?;
        let resume = store.read().resume_state.unwrap_or(Phase::DevReady);
        let record = transition(
            &project,
            &store,
            idle_in(resume).resume_state(Field::Clear),
        )?;
        InterruptFlag::new(project.interrupt_flag()).clear()?;
        Ok(record)
    }

    /// Any phase → `DEV_READY` with the review list emptied.
    pub fn continue_after_review(&self, name: &str) -> Result<StateRecord, ControlError> {
        let (project, store) = self.open(name)?;
        transition(
            &project,
            &store,
            idle_in(Phase::DevReady).review_items(Vec::new()),
        )
    }

    /// Fire one worker invocation. The state record is left to the worker.
    pub fn trigger_run(&self, name: &str) -> Result<RunTriggered, ControlError> {
        let (project, _) = self.open(name)?;
        let pid = self.supervisor.run_once(&project)?;
        Ok(RunTriggered {
            project: project.name().to_string(),
            pid,
        })
    }

    pub fn start_auto_run(&self, name: &str) -> Result<StateRecord, ControlError> {
        let (project, store) = self.open(name)?;
        self.supervisor.start(&project, &store)
    }

    pub fn stop_auto_run(&self, name: &str) -> Result<StateRecord, ControlError> {
        let (project, store) = self.open(name)?;
        self.supervisor.stop(&project, &store)
    }
}

/// Move to `phase` with no in-flight run and fresh timestamps.
fn idle_in(phase: Phase) -> StateUpdate {
    StateUpdate::new().phase(phase).clear_run().touch(now_epoch())
}

fn transition(
    project: &Project,
    store: &StateStore,
    update: StateUpdate,
) -> Result<StateRecord, ControlError> {
    let record = store.merge(&update)?;
    tracing::info!(
        project = project.name(),
        state = record.state.as_ref().map(Phase::as_str).unwrap_or("-"),
        "state transition"
    );
    Ok(record)
}

fn interaction_view(project: &Project, record: &StateRecord) -> InteractionView {
    InteractionView {
        notes: read_text_or_empty(&project.interaction_file()),
        interactive_mode: record.is_interactive(),
        state: record.state.clone(),
        resume_state: record.resume_state.clone(),
    }
}

fn read_text_or_empty(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

fn write_note(path: &Path, text: &str) -> Result<(), ControlError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

fn discover_review_items(root: &Path) -> Vec<String> {
    let mut items = Vec::new();
    for folder in REVIEW_FOLDERS {
        let pattern = root.join(folder).join("**").join("*.md");
        let Some(pattern) = pattern.to_str() else {
            continue;
        };
        let Ok(paths) = glob::glob(pattern) else {
            continue;
        };
        for path in paths.filter_map(|p| p.ok()).filter(|p| p.is_file()) {
            if let Ok(rel) = path.strip_prefix(root) {
                let rel: Vec<String> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                items.push(rel.join("/"));
            }
        }
    }
    items.sort();
    items
}
