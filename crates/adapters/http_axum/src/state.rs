//! Shared application state for axum handlers.

use std::sync::Arc;

use luxhub_app::executor::CommandExecutor;
use luxhub_app::permission_service::PermissionService;
use luxhub_app::ports::{
    Assistant, DeviceCommander, DeviceDirectory, PermissionRepository, UserRepository,
};
use luxhub_app::reconciler::Reconciler;

/// Application state shared across all axum handlers.
///
/// Generic over the port implementations to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do
/// not need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<UR, PR, DD, DC, AS> {
    /// Account lookups (identity comes from the transport).
    pub users: Arc<UR>,
    /// Grant management and cascade resolution.
    pub permissions: Arc<PermissionService<PR, DD>>,
    /// Snapshot cache + activation tracking.
    pub reconciler: Arc<Reconciler<DD>>,
    /// Batch execution against the device cloud.
    pub executor: Arc<CommandExecutor<DC>>,
    /// The language-model collaborator.
    pub assistant: Arc<AS>,
}

impl<UR, PR, DD, DC, AS> Clone for AppState<UR, PR, DD, DC, AS> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            permissions: Arc::clone(&self.permissions),
            reconciler: Arc::clone(&self.reconciler),
            executor: Arc::clone(&self.executor),
            assistant: Arc::clone(&self.assistant),
        }
    }
}

impl<UR, PR, DD, DC, AS> AppState<UR, PR, DD, DC, AS>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Services are shared with the background poll task, so the binary
    /// constructs the `Arc`s first and hands clones here.
    pub fn new(
        users: Arc<UR>,
        permissions: Arc<PermissionService<PR, DD>>,
        reconciler: Arc<Reconciler<DD>>,
        executor: Arc<CommandExecutor<DC>>,
        assistant: Arc<AS>,
    ) -> Self {
        Self {
            users,
            permissions,
            reconciler,
            executor,
            assistant,
        }
    }
}
