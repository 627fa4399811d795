use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A project's position in the production pipeline.
///
/// `Running` and entry into the two review phases are written by the
/// external worker; the controller only transitions out of them. Values
/// outside the known set are kept verbatim in `Other` so a record written by
/// a newer worker survives a merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    Paused,
    IntakeReady,
    DevReady,
    Running,
    ReviewReady,
    ReviewWaiting,
    PauseInteract,
    Other(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paused => "PAUSED",
            Self::IntakeReady => "INTAKE_READY",
            Self::DevReady => "DEV_READY",
            Self::Running => "RUNNING",
            Self::ReviewReady => "REVIEW_READY",
            Self::ReviewWaiting => "REVIEW_WAITING",
            Self::PauseInteract => "PAUSE_INTERACT",
            Self::Other(s) => s,
        }
    }

    /// Phases in which a human is expected to be looking at the project.
    /// Leaving interactive mode from one of these forces the project back to
    /// `DevReady`.
    pub fn is_interactive_hold(&self) -> bool {
        matches!(
            self,
            Self::ReviewReady | Self::ReviewWaiting | Self::PauseInteract
        )
    }
}

impl From<String> for Phase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PAUSED" => Self::Paused,
            "INTAKE_READY" => Self::IntakeReady,
            "DEV_READY" => Self::DevReady,
            "RUNNING" => Self::Running,
            "REVIEW_READY" => Self::ReviewReady,
            "REVIEW_WAITING" => Self::ReviewWaiting,
            "PAUSE_INTERACT" => Self::PauseInteract,
            _ => Self::Other(s),
        }
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.as_str().to_string()
    }
}

impl FromStr for Phase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_phases_roundtrip_through_json() {
        for phase in [
            Phase::Paused,
            Phase::IntakeReady,
            Phase::DevReady,
            Phase::Running,
            Phase::ReviewReady,
            Phase::ReviewWaiting,
            Phase::PauseInteract,
        ] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            let back: Phase = serde_json::from_str(&json).unwrap();
            assert_eq!(back, phase);
        }
    }

    #[test]
    fn test_unknown_phase_is_preserved() {
        let phase: Phase = serde_json::from_str("\"OUTLINE_READY\"").unwrap();
        assert_eq!(phase, Phase::Other("OUTLINE_READY".into()));
        assert_eq!(serde_json::to_string(&phase).unwrap(), "\"OUTLINE_READY\"");
    }

    #[test]
    fn test_interactive_hold_set() {
        assert!(Phase::ReviewReady.is_interactive_hold());
        assert!(Phase::ReviewWaiting.is_interactive_hold());
        assert!(Phase::PauseInteract.is_interactive_hold());
        assert!(!Phase::DevReady.is_interactive_hold());
        assert!(!Phase::Running.is_interactive_hold());
        assert!(!Phase::Paused.is_interactive_hold());
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Phase::DevReady.to_string(), "DEV_READY");
        assert_eq!("PAUSED".parse::<Phase>().unwrap(), Phase::Paused);
    }
}
