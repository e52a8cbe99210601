//! JSON REST handlers for user and grant administration. Admin only.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use luxhub_app::ports::{
    Assistant, DeviceCommander, DeviceDirectory, PermissionRepository, UserRepository,
};
use luxhub_domain::error::{LuxhubError, NotFoundError};
use luxhub_domain::id::UserId;
use luxhub_domain::user::{GrantKind, PermissionGrant, ResolvedPermissionSet, User};

use crate::error::ApiError;
use crate::identity::{current_user, require_admin};
use crate::state::AppState;

/// Request body for creating or removing a grant.
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub kind: GrantKind,
    pub value: String,
}

/// A user's grants plus their resolved cascade.
#[derive(Debug, Serialize)]
pub struct GrantsResponse {
    pub grants: Vec<PermissionGrant>,
    pub resolved: ResolvedPermissionSet,
}

async fn lookup_user<UR: UserRepository>(users: &UR, id: i64) -> Result<User, LuxhubError> {
    users.get_by_id(UserId::new(id)).await?.ok_or_else(|| {
        NotFoundError {
            entity: "User",
            id: id.to_string(),
        }
        .into()
    })
}

/// `GET /api/users`
pub async fn list_users<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let caller = current_user(&*state.users, &headers).await?;
    require_admin(&caller)?;
    Ok(Json(state.users.list().await?))
}

/// `GET /api/users/{id}/grants`
pub async fn list<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<GrantsResponse>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let caller = current_user(&*state.users, &headers).await?;
    require_admin(&caller)?;
    let user = lookup_user(&*state.users, id).await?;

    Ok(Json(GrantsResponse {
        grants: state.permissions.list_grants(user.id).await?,
        resolved: state.permissions.resolved(user.id).await?,
    }))
}

/// `POST /api/users/{id}/grants`
pub async fn create<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<GrantRequest>,
) -> Result<(StatusCode, Json<ResolvedPermissionSet>), ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let caller = current_user(&*state.users, &headers).await?;
    require_admin(&caller)?;
    let user = lookup_user(&*state.users, id).await?;

    let resolved = state
        .permissions
        .grant(user.id, request.kind, &request.value)
        .await?;
    Ok((StatusCode::CREATED, Json(resolved)))
}

/// `DELETE /api/users/{id}/grants`
pub async fn remove<UR, PR, DD, DC, AS>(
    State(state): State<AppState<UR, PR, DD, DC, AS>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<GrantRequest>,
) -> Result<Json<ResolvedPermissionSet>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    PR: PermissionRepository + Send + Sync + 'static,
    DD: DeviceDirectory + Send + Sync + 'static,
    DC: DeviceCommander + Send + Sync + 'static,
    AS: Assistant + Send + Sync + 'static,
{
    let caller = current_user(&*state.users, &headers).await?;
    require_admin(&caller)?;
    let user = lookup_user(&*state.users, id).await?;

    let resolved = state
        .permissions
        .revoke(user.id, request.kind, &request.value)
        .await?;
    Ok(Json(resolved))
}
