use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::phase::Phase;

/// The per-project state document (`STATE.json`), viewed through its known
/// fields.
///
/// Decoding is per key. A known key moves into its typed field only when it
/// decodes cleanly; a null or a value of another JSON type stays in `extra`
/// under its own name, as does every key the worker adds. Serializing the
/// record therefore reproduces the document it was read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct StateRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_at: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_state: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_items: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_run_pid: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for StateRecord {
    fn from(mut doc: Map<String, Value>) -> Self {
        Self {
            state: take_typed(&mut doc, "state"),
            role: take_typed(&mut doc, "role"),
            run_id: take_typed(&mut doc, "run_id"),
            started_at: take_typed(&mut doc, "started_at"),
            updated_at: take_typed(&mut doc, "updated_at"),
            heartbeat_at: take_typed(&mut doc, "heartbeat_at"),
            interactive_mode: take_typed(&mut doc, "interactive_mode"),
            resume_state: take_typed(&mut doc, "resume_state"),
            review_items: take_typed(&mut doc, "review_items"),
            auto_run: take_typed(&mut doc, "auto_run"),
            auto_run_pid: take_typed(&mut doc, "auto_run_pid"),
            extra: doc,
        }
    }
}

/// Remove `key` from `doc` if it decodes as `T`; otherwise leave it in place.
fn take_typed<T: DeserializeOwned>(doc: &mut Map<String, Value>, key: &str) -> Option<T> {
    let typed = T::deserialize(doc.get(key)?).ok()?;
    doc.remove(key);
    Some(typed)
}

impl StateRecord {
    pub fn is_interactive(&self) -> bool {
        self.interactive_mode.unwrap_or(false)
    }
}

/// Update to a nullable field: leave it, null it, or set it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T: Serialize> Field<T> {
    fn write_into(&self, doc: &mut Map<String, Value>, key: &str) {
        match self {
            Field::Keep => {}
            Field::Clear => {
                doc.insert(key.to_string(), Value::Null);
            }
            Field::Set(value) => put(doc, key, value),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Field::Keep)
    }
}

fn put<T: Serialize + ?Sized>(doc: &mut Map<String, Value>, key: &str, value: &T) {
    if let Ok(value) = serde_json::to_value(value) {
        doc.insert(key.to_string(), value);
    }
}

/// A typed partial record. Every field defaults to "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub state: Option<Phase>,
    pub role: Field<String>,
    pub run_id: Field<String>,
    pub started_at: Field<f64>,
    pub updated_at: Option<f64>,
    pub heartbeat_at: Option<f64>,
    pub interactive_mode: Option<bool>,
    pub resume_state: Field<Phase>,
    pub review_items: Option<Vec<String>>,
    pub auto_run: Option<bool>,
    pub auto_run_pid: Field<u32>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-overwrite every key this update names. Keys it does not name,
    /// including ones the worker added, are left exactly as they are.
    pub fn write_into(&self, doc: &mut Map<String, Value>) {
        if let Some(state) = &self.state {
            put(doc, "state", state);
        }
        self.role.write_into(doc, "role");
        self.run_id.write_into(doc, "run_id");
        self.started_at.write_into(doc, "started_at");
        if let Some(ts) = &self.updated_at {
            put(doc, "updated_at", ts);
        }
        if let Some(ts) = &self.heartbeat_at {
            put(doc, "heartbeat_at", ts);
        }
        if let Some(mode) = &self.interactive_mode {
            put(doc, "interactive_mode", mode);
        }
        self.resume_state.write_into(doc, "resume_state");
        if let Some(items) = &self.review_items {
            put(doc, "review_items", items);
        }
        if let Some(auto_run) = &self.auto_run {
            put(doc, "auto_run", auto_run);
        }
        self.auto_run_pid.write_into(doc, "auto_run_pid");
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.state = Some(phase);
        self
    }

    /// Null out the metadata of an in-flight worker invocation.
    pub fn clear_run(mut self) -> Self {
        self.role = Field::Clear;
        self.run_id = Field::Clear;
        self.started_at = Field::Clear;
        self
    }

    /// Refresh both `updated_at` and `heartbeat_at`.
    pub fn touch(mut self, now: f64) -> Self {
        self.updated_at = Some(now);
        self.heartbeat_at = Some(now);
        self
    }

    pub fn interactive(mut self, mode: bool) -> Self {
        self.interactive_mode = Some(mode);
        self
    }

    pub fn resume_state(mut self, resume: Field<Phase>) -> Self {
        self.resume_state = resume;
        self
    }

    pub fn review_items(mut self, items: Vec<String>) -> Self {
        self.review_items = Some(items);
        self
    }

    pub fn auto_run(mut self, running: bool, pid: Option<u32>) -> Self {
        self.auto_run = Some(running);
        self.auto_run_pid = match pid {
            Some(pid) => Field::Set(pid),
            None => Field::Clear,
        };
        self
    }
}
