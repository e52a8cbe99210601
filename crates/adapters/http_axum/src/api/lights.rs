//! JSON REST handlers for lights.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;

use luxhub_app::authorization;
use luxhub_app::ports::{
    Assistant, DeviceCommander, DeviceDirectory, PermissionRepository, UserRepository,
};
use luxhub_app::resolver;
use luxhub_domain::command::{Command, CommandKind, StateChange};
use luxhub_domain::device::Device;
use luxhub_domain::error::LuxhubError;
use luxhub_domain::selector::Selector;

use crate::api::BatchResponse;
use crate::error::ApiError;
use crate::identity::current_user;
use crate::state::AppState;

/// `GET /api/lights`
pub async fn list<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Device>>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let user = current_user(&*state.users, &headers).await?;
    let snapshot = state.reconciler.snapshot().await?;
    let permissions = state.permissions.resolved(user.id).await?;
    let visible = authorization::filter_visible(&user, &permissions, &snapshot.devices);
    Ok(Json(visible.into_iter().cloned().collect()))
}

/// `PUT /api/toggle/{selector}`
pub async fn toggle<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Path(selector): Path<String>,
) -> Result<Json<BatchResponse>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    run_single(
        &state,
        &headers,
        &selector,
        CommandKind::Toggle,
        &format!("Toggle {selector}"),
    )
    .await
}

/// `PUT /api/group/{group_id}/toggle`
pub async fn toggle_group<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Path(group_id): Path<String>,
) -> Result<Json<BatchResponse>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let selector = format!("group_id:{group_id}");
    run_single(
        &state,
        &headers,
        &selector,
        CommandKind::Toggle,
        &format!("Toggle group {group_id}"),
    )
    .await
}

/// `PUT /api/lights/{selector}/state`
pub async fn set_state<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Path(selector): Path<String>,
    Json(change): Json<StateChange>,
) -> Result<Json<BatchResponse>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    if change.is_empty() {
        return Err(LuxhubError::from(luxhub_domain::error::ValidationError::EmptyStateChange)
            .into());
    }
    run_single(
        &state,
        &headers,
        &selector,
        CommandKind::SetState(change),
        &format!("Set state on {selector}"),
    )
    .await
}

/// Shared path for the single-operation endpoints: pre-flight the
/// authorization so a denial surfaces as `403` instead of a failed batch
/// entry, then dispatch through the executor.
async fn run_single<UR, PR, DD, DC, AS>(
    state: &AppState<UR, PR, DD, DC, AS>,
    headers: &HeaderMap,
    selector: &str,
    kind: CommandKind,
    description: &str,
) -> Result<Json<BatchResponse>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let user = current_user(&*state.users, headers).await?;
    let snapshot = state.reconciler.snapshot().await?;
    let permissions = state.permissions.resolved(user.id).await?;

    let parsed = Selector::parse(selector).map_err(LuxhubError::from)?;
    let targets = resolver::resolve(&parsed, &snapshot)?;
    let verdict = authorization::authorize(&user, &permissions, targets, &snapshot);
    authorization::require_any(verdict, &user, selector)?;

    let command = Command {
        selector: parsed,
        kind,
        description: description.to_string(),
    };
    let report = state
        .executor
        .execute(&user, &permissions, &snapshot, vec![command], None)
        .await;
    Ok(Json(BatchResponse::from(report)))
}
