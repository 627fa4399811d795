use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde_json::{Map, Value};

use super::record::{StateRecord, StateUpdate};
use crate::errors::ControlError;

/// Durable, mergeable state record for one project.
///
/// `merge` is the only write path. It holds an exclusive advisory lock on a
/// sibling `.lock` file for the whole read-modify-write, so the background
/// loop (a separate process) and concurrent requests cannot lose each
/// other's updates as long as they also go through the lock.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current record. Missing or malformed files read as empty.
    pub fn read(&self) -> StateRecord {
        StateRecord::from(self.read_document())
    }

    /// The raw JSON object on disk. A missing file, a parse error or a
    /// top-level value that is not an object all read as an empty map.
    pub fn read_document(&self) -> Map<String, Value> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str(&content) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => {
                tracing::debug!(path = %self.path.display(), "state record is not an object, treating as empty");
                Map::new()
            }
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "unreadable state record, treating as empty");
                Map::new()
            }
        }
    }

    /// Overwrite the keys `update` names, persist and return the result.
    /// Every other key on disk is written back as it was found.
    pub fn merge(&self, update: &StateUpdate) -> Result<StateRecord, ControlError> {
        let lock = self.lock()?;

        let mut doc = self.read_document();
        update.write_into(&mut doc);
        self.write(&doc)?;

        // Dropping the handle releases the lock; unlock explicitly so a
        // failure shows up in the logs.
        if let Err(e) = lock.unlock() {
            tracing::warn!(path = %self.lock_path.display(), error = %e, "failed to release state lock");
        }
        Ok(StateRecord::from(doc))
    }

    fn lock(&self) -> Result<File, ControlError> {
        let lock_failed = |source| ControlError::StateLockFailed {
            path: self.lock_path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(lock_failed)?;
        file.lock_exclusive().map_err(lock_failed)?;
        Ok(file)
    }

    /// Write through a temp file + rename so readers never see a partial record.
    fn write(&self, doc: &Map<String, Value>) -> Result<(), ControlError> {
        let write_failed = |source| ControlError::StateWriteFailed {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| write_failed(std::io::Error::other(e)))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_failed)?;
        fs::rename(&tmp, &self.path).map_err(write_failed)?;
        Ok(())
    }
}
