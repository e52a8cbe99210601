//! Commander port — dispatching write operations to the device cloud.

use std::future::Future;

use serde::{Deserialize, Serialize};

use luxhub_domain::command::StateChange;
use luxhub_domain::error::LuxhubError;
use luxhub_domain::id::{DeviceId, SceneId};
use luxhub_domain::selector::Selector;
use luxhub_domain::time::Timestamp;

/// Per-device acceptance reported by the cloud for a write operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAcceptance {
    pub id: DeviceId,
    pub label: String,
    pub status: AcceptanceStatus,
}

/// Cloud-reported status for one device in a write response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceStatus {
    Ok,
    TimedOut,
    Offline,
}

impl AcceptanceStatus {
    /// Whether the cloud accepted the command for this device.
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Remaining request quota, from the collaborator's response metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBudget {
    pub remaining: u32,
    pub reset_at: Timestamp,
}

/// Result of one accepted write operation.
#[derive(Debug, Clone, Default)]
pub struct CommandReceipt {
    /// Per-device acceptance; empty for operations the cloud reports
    /// without a result list (scene activation).
    pub results: Vec<DeviceAcceptance>,
    /// Quota metadata from the response, when present.
    pub rate: Option<RateBudget>,
}

impl CommandReceipt {
    /// `accepted/total` counts over the per-device results.
    #[must_use]
    pub fn accepted(&self) -> (usize, usize) {
        let ok = self.results.iter().filter(|r| r.status.is_ok()).count();
        (ok, self.results.len())
    }
}

/// Write side of the device-cloud collaborator.
///
/// Implementations own quota tracking: when the remaining budget is
/// exhausted, every method fails fast with
/// [`LuxhubError::RateLimited`](luxhub_domain::error::LuxhubError::RateLimited)
/// instead of queuing. There is no cancellation of an in-flight command.
pub trait DeviceCommander {
    /// Apply a state change to the devices addressed by `selector`.
    fn set_state(
        &self,
        selector: &Selector,
        change: &StateChange,
    ) -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send;

    /// Flip power on the devices addressed by `selector`.
    fn toggle(&self, selector: &Selector)
    -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send;

    /// Ask the cloud to activate a scene.
    fn activate_scene(
        &self,
        scene: SceneId,
    ) -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send;
}

impl<C: DeviceCommander + Send + Sync> DeviceCommander for std::sync::Arc<C> {
    fn set_state(
        &self,
        selector: &Selector,
        change: &StateChange,
    ) -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send {
        (**self).set_state(selector, change)
    }

    fn toggle(
        &self,
        selector: &Selector,
    ) -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send {
        (**self).toggle(selector)
    }

    fn activate_scene(
        &self,
        scene: SceneId,
    ) -> impl Future<Output = Result<CommandReceipt, LuxhubError>> + Send {
        (**self).activate_scene(scene)
    }
}
