//! Storage port — repository traits for users and permission grants.

use std::future::Future;

use luxhub_domain::error::LuxhubError;
use luxhub_domain::id::UserId;
use luxhub_domain::user::{PermissionGrant, ResolvedPermissionSet, User};

/// Repository for accounts. Credential storage and the login flow live in
/// an external collaborator; this port only reads identities.
pub trait UserRepository {
    /// Get a user by row id.
    fn get_by_id(&self, id: UserId) -> impl Future<Output = Result<Option<User>, LuxhubError>> + Send;

    /// Get a user by username.
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, LuxhubError>> + Send;

    /// The seeded shared guest identity.
    fn guest(&self) -> impl Future<Output = Result<User, LuxhubError>> + Send;

    /// All known users.
    fn list(&self) -> impl Future<Output = Result<Vec<User>, LuxhubError>> + Send;
}

/// Repository for grants and their save-time cascade results.
///
/// The `save_*` methods persist a grant mutation **and** the freshly
/// resolved cascade in one transaction, so a stored grant is never visible
/// without its resolved set.
pub trait PermissionRepository {
    /// Insert a grant (idempotent — duplicates collapse) and replace the
    /// user's resolved set.
    fn save_grant(
        &self,
        grant: &PermissionGrant,
        resolved: &ResolvedPermissionSet,
    ) -> impl Future<Output = Result<(), LuxhubError>> + Send;

    /// Remove a grant and replace the user's resolved set.
    fn remove_grant(
        &self,
        grant: &PermissionGrant,
        resolved: &ResolvedPermissionSet,
    ) -> impl Future<Output = Result<(), LuxhubError>> + Send;

    /// All grants for a user.
    fn grants_for(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<PermissionGrant>, LuxhubError>> + Send;

    /// The persisted cascade, if one was ever saved for this user.
    fn load_resolved(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Option<ResolvedPermissionSet>, LuxhubError>> + Send;

    /// Persist a recomputed cascade without touching grants (lazy re-derive).
    fn save_resolved(
        &self,
        user: UserId,
        resolved: &ResolvedPermissionSet,
    ) -> impl Future<Output = Result<(), LuxhubError>> + Send;
}
