use serde::Serialize;
use serde_json::Value;

use crate::state::Phase;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTail {
    pub tail: i64,
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeView {
    pub questions: String,
    pub answers: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionView {
    pub notes: String,
    pub interactive_mode: bool,
    pub state: Option<Phase>,
    pub resume_state: Option<Phase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    pub state: Option<Phase>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunTriggered {
    pub project: String,
    pub pid: u32,
}
