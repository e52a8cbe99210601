//! Request identity resolution.
//!
//! Credential checking and sessions live in an external collaborator; the
//! transport hands this layer an already-established username via the
//! `x-luxhub-user` header. Requests without the header resolve to the
//! seeded guest user.

use axum::http::HeaderMap;

use luxhub_app::ports::UserRepository;
use luxhub_domain::error::{LuxhubError, NotFoundError};
use luxhub_domain::user::User;

/// Header carrying the authenticated username.
pub const USER_HEADER: &str = "x-luxhub-user";

/// Resolve the requesting user: named header → that account, no header →
/// guest. An unknown username is a `NotFound` error, not a guest fallback.
///
/// # Errors
///
/// Returns [`LuxhubError::NotFound`] for an unknown username, or a storage
/// error from the repository.
pub async fn current_user<UR: UserRepository>(
    users: &UR,
    headers: &HeaderMap,
) -> Result<User, LuxhubError> {
    let Some(value) = headers.get(USER_HEADER) else {
        return users.guest().await;
    };
    let username = value.to_str().map_err(|_| NotFoundError {
        entity: "User",
        id: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    })?;
    match users.get_by_username(username).await? {
        Some(user) => Ok(user),
        None => Err(NotFoundError {
            entity: "User",
            id: username.to_string(),
        }
        .into()),
    }
}

/// Reject non-admin callers.
///
/// # Errors
///
/// Returns [`LuxhubError::PermissionDenied`] when `user` is not an admin.
pub fn require_admin(user: &User) -> Result<(), LuxhubError> {
    if user.is_admin() {
        return Ok(());
    }
    Err(luxhub_domain::error::PermissionDeniedError {
        username: user.username.clone(),
        selector: "admin".to_string(),
    }
    .into())
}
