//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use luxhub_app::ports::{
    Assistant, DeviceCommander, DeviceDirectory, PermissionRepository, UserRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts API routes under `/api` and includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level.
pub fn build<UR, PR, DD, DC, AS>(state: AppState<UR, PR, DD, DC, AS>) -> Router
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
