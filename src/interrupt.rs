//! Cooperative pause request shared with the external worker.
//!
//! Two-party protocol:
//! 1. The controller creates `notes/interrupt.flag` (the request).
//! 2. The worker polls for the flag at its checkpoints and, on seeing it,
//!    stops and moves the project's phase itself (the acknowledgement).
//!
//! Only the flag's existence carries meaning. There is no delivery latency
//! guarantee; the worker notices the flag whenever it next checks.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const FLAG_MARKER: &str = "pause requested\n";

#[derive(Debug, Clone)]
pub struct InterruptFlag {
    path: PathBuf,
}

impl InterruptFlag {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or overwrite the flag.
    pub fn request(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, FLAG_MARKER)
    }

    /// Remove the flag. Absence is not an error.
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }
}
