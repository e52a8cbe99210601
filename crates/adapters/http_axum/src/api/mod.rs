//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod assistant;
#[allow(clippy::missing_errors_doc)]
pub mod grants;
#[allow(clippy::missing_errors_doc)]
pub mod lights;
#[allow(clippy::missing_errors_doc)]
pub mod scenes;

use axum::Router;
use axum::routing::{get, post, put};
use serde::Serialize;

use luxhub_app::ports::{
    Assistant, DeviceCommander, DeviceDirectory, PermissionRepository, UserRepository,
};
use luxhub_domain::command::BatchReport;

use crate::state::AppState;

/// Batch report plus the derived overall-success flag.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: BatchReport,
}

impl From<BatchReport> for BatchResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            success: report.success(),
            report,
        }
    }
}

/// Build the `/api` sub-router.
pub fn routes<UR, PR, DD, DC, AS>() -> Router<AppState<UR, PR, DD, DC, AS>>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    Router::new()
        // Lights
        .route("/lights", get(lights::list::<UR, PR, DD, DC, AS>))
        .route(
            "/lights/{selector}/state",
            put(lights::set_state::<UR, PR, DD, DC, AS>),
        )
        .route("/toggle/{selector}", put(lights::toggle::<UR, PR, DD, DC, AS>))
        .route(
            "/group/{group_id}/toggle",
            put(lights::toggle_group::<UR, PR, DD, DC, AS>),
        )
        // Scenes
        .route("/scenes", get(scenes::list::<UR, PR, DD, DC, AS>))
        .route(
            "/scenes/status/batch",
            get(scenes::status_batch::<UR, PR, DD, DC, AS>),
        )
        .route("/scene/{scene_uuid}", put(scenes::activate::<UR, PR, DD, DC, AS>))
        .route(
            "/scene/{scene_uuid}/status",
            get(scenes::status::<UR, PR, DD, DC, AS>),
        )
        // Users & grants (admin)
        .route("/users", get(grants::list_users::<UR, PR, DD, DC, AS>))
        .route(
            "/users/{id}/grants",
            get(grants::list::<UR, PR, DD, DC, AS>)
                .post(grants::create::<UR, PR, DD, DC, AS>)
                .delete(grants::remove::<UR, PR, DD, DC, AS>),
        )
        // Natural language
        .route(
            "/natural-language",
            post(assistant::natural_language::<UR, PR, DD, DC, AS>),
        )
}
