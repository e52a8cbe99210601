//! JSON REST handlers for scenes and scene status.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;

use luxhub_app::authorization;
use luxhub_app::ports::{
    Assistant, DeviceCommander, DeviceDirectory, PermissionRepository, UserRepository,
};
use luxhub_app::reconciler::SceneStatus;
use luxhub_domain::command::{Command, CommandKind};
use luxhub_domain::error::{LuxhubError, NotFoundError, SelectorError};
use luxhub_domain::id::SceneId;
use luxhub_domain::scene::Scene;
use luxhub_domain::selector::Selector;

use crate::api::BatchResponse;
use crate::error::ApiError;
use crate::identity::current_user;
use crate::state::AppState;

fn parse_scene_id(raw: &str) -> Result<SceneId, LuxhubError> {
    SceneId::from_str(raw)
        .map_err(|_| {
            SelectorError::Malformed {
                input: format!("scene_id:{raw}"),
            }
            .into()
        })
}

/// `GET /api/scenes`
pub async fn list<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Scene>>, ApiError>
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
    let visible = authorization::filter_visible_scenes(&user, &permissions, &snapshot.scenes);
    Ok(Json(visible.into_iter().cloned().collect()))
}

/// `PUT /api/scene/{scene_uuid}` — activate a scene.
pub async fn activate<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Path(scene_uuid): Path<String>,
) -> Result<Json<BatchResponse>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let user = current_user(&*state.users, &headers).await?;
    let scene_id = parse_scene_id(&scene_uuid)?;
    let snapshot = state.reconciler.snapshot().await?;
    let permissions = state.permissions.resolved(user.id).await?;

    // All-or-nothing: a partially permitted scene is rejected, not
    // partially applied. Pre-flighting turns the denial into a 403.
    authorization::authorize_scene_activation(&user, &permissions, scene_id, &snapshot)?;

    let label = snapshot
        .scene(&scene_id)
        .map_or_else(|| scene_id.to_string(), |s| s.label.clone());
    let command = Command {
        selector: Selector::Scene(scene_id),
        kind: CommandKind::ActivateScene,
        description: format!("Activate scene {label}"),
    };
    let report = state
        .executor
        .execute(&user, &permissions, &snapshot, vec![command], None)
        .await;
    Ok(Json(BatchResponse::from(report)))
}

/// `GET /api/scene/{scene_uuid}/status`
pub async fn status<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Path(scene_uuid): Path<String>,
) -> Result<Json<SceneStatus>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let user = current_user(&*state.users, &headers).await?;
    let scene_id = parse_scene_id(&scene_uuid)?;
    let snapshot = state.reconciler.snapshot().await?;
    let permissions = state.permissions.resolved(user.id).await?;

    let visible = authorization::filter_visible_scenes(&user, &permissions, &snapshot.scenes);
    if !visible.iter().any(|s| s.id == scene_id) {
        return Err(LuxhubError::from(NotFoundError {
            entity: "Scene",
            id: scene_uuid,
        })
        .into());
    }

    state
        .reconciler
        .scene_statuses(&snapshot)
        .into_iter()
        .find(|s| s.scene == scene_id)
        .map(Json)
        .ok_or_else(|| {
            LuxhubError::from(NotFoundError {
                entity: "Scene",
                id: scene_id.to_string(),
            })
            .into()
        })
}

/// `GET /api/scenes/status/batch`
pub async fn status_batch<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
) -> Result<Json<BTreeMap<String, SceneStatus>>, ApiError>
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

    let visible: Vec<SceneId> =
        authorization::filter_visible_scenes(&user, &permissions, &snapshot.scenes)
            .into_iter()
            .map(|s| s.id)
            .collect();

    let statuses = state
        .reconciler
        .scene_statuses(&snapshot)
        .into_iter()
        .filter(|s| visible.contains(&s.scene))
        .map(|s| (s.scene.to_string(), s))
        .collect();
    Ok(Json(statuses))
}
