//! Natural-language endpoint — assistant proposal → validate → authorize →
//! execute.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use luxhub_app::authorization;
use luxhub_app::ports::{
    Assistant, AssistantContext, DeviceCommander, DeviceDirectory, PermissionRepository,
    UserRepository,
};
use luxhub_domain::error::PermissionDeniedError;

use crate::api::BatchResponse;
use crate::error::ApiError;
use crate::identity::current_user;
use crate::state::AppState;

/// Request body for the natural-language endpoint.
#[derive(Debug, Deserialize)]
pub struct NaturalLanguageRequest {
    pub request: String,
}

/// `POST /api/natural-language`
pub async fn natural_language<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Json(body): Json<NaturalLanguageRequest>,
) -> Result<Json<BatchResponse>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let user = current_user(&*state.users, &headers).await?;
    if !user.nlp_enabled {
        return Err(luxhub_domain::error::LuxhubError::from(PermissionDeniedError {
            username: user.username.clone(),
            selector: "natural-language".to_string(),
        })
        .into());
    }

    let snapshot = state.reconciler.snapshot().await?;
    let permissions = state.permissions.resolved(user.id).await?;

    // The model only ever sees what the user sees.
    let context = AssistantContext {
        devices: authorization::filter_visible(&user, &permissions, &snapshot.devices)
            .into_iter()
            .cloned()
            .collect(),
        scenes: authorization::filter_visible_scenes(&user, &permissions, &snapshot.scenes)
            .into_iter()
            .cloned()
            .collect(),
    };

    let batch = state.assistant.propose(&body.request, &context).await?;
    let report = state
        .executor
        .execute_proposals(&user, &permissions, &snapshot, batch)
        .await;
    Ok(Json(BatchResponse::from(report)))
}
