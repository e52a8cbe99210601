//! Commands — the closed set of device operations and their outcomes.
//!
//! Candidate actions arrive from two directions: direct API calls and the
//! language-model collaborator. Both are funnelled through [`Command::parse`]
//! so only the supported operation kinds survive the boundary; unknown kinds
//! are rejected as selector-class errors, never forwarded.

use serde::{Deserialize, Serialize};

use crate::device::Power;
use crate::error::SelectorError;
use crate::selector::Selector;

/// Desired state for a set-state operation.
///
/// `color` is an opaque cloud color specification (`"red"`, `"#ff0000"`,
/// `"hue:120 saturation:1.0"`, `"kelvin:2700"`); the cloud validates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Brightness in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Transition duration in seconds; the dispatcher fills a default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl StateChange {
    /// Nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.power.is_none()
            && self.color.is_none()
            && self.brightness.is_none()
    }
}

/// Supported operation kinds (closed set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "state")]
pub enum CommandKind {
    /// Flip power on the addressed devices.
    Toggle,
    /// Apply a state change to the addressed devices.
    SetState(StateChange),
    /// Activate a scene; the selector must be a scene selector.
    ActivateScene,
}

impl CommandKind {
    /// Short wire name for reporting.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::SetState(_) => "set_state",
            Self::ActivateScene => "activate_scene",
        }
    }
}

/// One candidate operation: a target plus what to do to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub selector: Selector,
    #[serde(flatten)]
    pub kind: CommandKind,
    /// Human-readable description, echoed into the outcome.
    pub description: String,
}

impl Command {
    /// Validate a raw (kind, selector, state) triple into a [`Command`].
    ///
    /// Accepts `-` and `_` interchangeably in kind names. A set-state with
    /// no state, or an activate-scene whose selector is not a scene, is
    /// rejected the same way an unknown kind is.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::UnsupportedOperation`] for kinds outside
    /// the closed set, or [`SelectorError::Malformed`] for a bad selector.
    pub fn parse(
        kind: &str,
        selector: &str,
        state: Option<StateChange>,
        description: &str,
    ) -> Result<Self, SelectorError> {
        let selector = Selector::parse(selector)?;
        let kind = match kind.replace('-', "_").as_str() {
            "toggle" => CommandKind::Toggle,
            "set_state" => {
                let state = state.filter(|s| !s.is_empty()).ok_or_else(|| {
                    SelectorError::UnsupportedOperation("set_state without state".to_string())
                })?;
                CommandKind::SetState(state)
            }
            "activate_scene" => {
                if !matches!(selector, Selector::Scene(_)) {
                    return Err(SelectorError::UnsupportedOperation(
                        "activate_scene requires a scene selector".to_string(),
                    ));
                }
                CommandKind::ActivateScene
            }
            other => return Err(SelectorError::UnsupportedOperation(other.to_string())),
        };
        Ok(Self {
            selector,
            kind,
            description: description.to_string(),
        })
    }
}

/// Per-operation result; batches never abort on one failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Echo of the command description.
    pub description: String,
    pub success: bool,
    /// Extra context on success (e.g. `"updated 8/10 zones"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Error text on failure, classified by the caller via the batch report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutcome {
    /// A successful outcome with optional detail.
    #[must_use]
    pub fn ok(description: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            description: description.into(),
            success: true,
            detail,
            error: None,
        }
    }

    /// A failed outcome carrying the error text.
    #[must_use]
    pub fn failed(description: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: false,
            detail: None,
            error: Some(error.into()),
        }
    }
}

/// Batch-level result: the full per-operation list, plus an optional
/// caller-facing summary (the assistant's, when present).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub results: Vec<CommandOutcome>,
}

impl BatchReport {
    /// Overall success: at least one operation succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.results.iter().any(|r| r.success)
    }

    /// Whether some but not all operations failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.success() && self.results.iter().any(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SceneId;

    #[test]
    fn should_parse_toggle() {
        let cmd = Command::parse("toggle", "id:d073d5000001", None, "toggle desk lamp").unwrap();
        assert_eq!(cmd.kind, CommandKind::Toggle);
    }

    #[test]
    fn should_parse_set_state_with_hyphen_or_underscore() {
        let state = StateChange {
            power: Some(Power::On),
            color: Some("red".to_string()),
            brightness: Some(1.0),
            duration: None,
        };
        for kind in ["set-state", "set_state"] {
            let cmd = Command::parse(kind, "group_id:g1", Some(state.clone()), "red").unwrap();
            assert!(matches!(cmd.kind, CommandKind::SetState(_)));
        }
    }

    #[test]
    fn should_reject_set_state_without_state() {
        let result = Command::parse("set_state", "id:d073d5000001", None, "noop");
        assert!(matches!(
            result,
            Err(SelectorError::UnsupportedOperation(_))
        ));
        let empty = Some(StateChange::default());
        let result = Command::parse("set_state", "id:d073d5000001", empty, "noop");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_unknown_kind() {
        let result = Command::parse("pulse", "all", None, "party");
        assert!(matches!(
            result,
            Err(SelectorError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn should_require_scene_selector_for_activate_scene() {
        let id = SceneId::new();
        assert!(Command::parse("activate_scene", &format!("scene_id:{id}"), None, "x").is_ok());
        assert!(Command::parse("activate_scene", "id:d073d5000001", None, "x").is_err());
    }

    #[test]
    fn should_report_batch_success_when_any_operation_succeeded() {
        let report = BatchReport {
            summary: None,
            results: vec![
                CommandOutcome::ok("one", None),
                CommandOutcome::failed("two", "denied"),
            ],
        };
        assert!(report.success());
        assert!(report.is_partial());
    }

    #[test]
    fn should_report_batch_failure_when_every_operation_failed() {
        let report = BatchReport {
            summary: None,
            results: vec![CommandOutcome::failed("one", "device unreachable")],
        };
        assert!(!report.success());
        assert!(!report.is_partial());
    }
}
