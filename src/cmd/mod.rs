//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled                                            |
//! |-------------|-------------------------------------------------------------|
//! | `serve`     | `Serve`                                                     |
//! | `project`   | `Projects`, `Status`                                        |
//! | `control`   | `Pause`, `Resume`, `Run`, `Intake`, `Interrupt`, `Continue`, |
//! |             | `ReviewContinue`, `Interactive`                             |
//! | `auto_run`  | `AutoRun`                                                   |
//! | `config`    | `Config`                                                    |

pub mod auto_run;
pub mod config;
pub mod control;
pub mod project;
pub mod serve;

use folio::config::Config;
use folio::controller::ProjectController;
use folio::supervisor::Supervisor;

pub use auto_run::cmd_auto_run;
pub use config::cmd_config;
pub use control::{
    cmd_continue, cmd_intake, cmd_interactive, cmd_interrupt, cmd_pause, cmd_resume,
    cmd_review_continue, cmd_run,
};
pub use project::{cmd_projects, cmd_status};
pub use serve::cmd_serve;

fn controller(config: &Config) -> ProjectController {
    ProjectController::new(config.projects_dir.clone(), Supervisor::from_config(config))
}
