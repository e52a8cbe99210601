//! Assistant port — the language-model collaborator.
//!
//! The assistant receives the caller's *visible* directory and a free-form
//! request, and proposes a candidate batch. Its output is never trusted as
//! pre-authorized: every proposed action goes through [`Command::parse`]
//! (closed kind set) and the authorization gate before dispatch.
//!
//! [`Command::parse`]: luxhub_domain::command::Command::parse

use std::future::Future;

use serde::{Deserialize, Serialize};

use luxhub_domain::command::StateChange;
use luxhub_domain::device::Device;
use luxhub_domain::error::LuxhubError;
use luxhub_domain::scene::Scene;

/// The permitted-device context handed to the model.
///
/// Already visibility-filtered for the requesting user — the model never
/// sees devices the user may not see.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantContext {
    pub devices: Vec<Device>,
    pub scenes: Vec<Scene>,
}

/// One raw proposed action. Kind and selector stay untyped strings here;
/// validation happens in the executor, not in the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    pub kind: String,
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateChange>,
    pub description: String,
}

/// A candidate batch from the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposedBatch {
    /// Model-authored summary of what the batch does.
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub actions: Vec<ProposedAction>,
    /// Set when the model declines the request instead of proposing actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The language-model collaborator.
pub trait Assistant {
    /// Translate a free-form request into a candidate batch.
    fn propose(
        &self,
        request: &str,
        context: &AssistantContext,
    ) -> impl Future<Output = Result<ProposedBatch, LuxhubError>> + Send;
}
