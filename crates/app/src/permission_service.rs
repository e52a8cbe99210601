//! Permission store use-cases — grant management with save-time cascades.
//!
//! The cascade is expanded synchronously when a grant is saved, against the
//! snapshot available at that moment, and persisted next to the grant. It is
//! *not* recomputed when the directory later changes; a stale cascade is
//! tolerated until the next save. When the directory cannot be fetched the
//! save fails with `PermissionResolutionFailed` and nothing is stored —
//! a degraded snapshot must never resolve to more access than intended.

use luxhub_domain::directory::DirectorySnapshot;
use luxhub_domain::error::LuxhubError;
use luxhub_domain::id::UserId;
use luxhub_domain::user::{GrantKind, PermissionGrant, ResolvedPermissionSet};

use crate::ports::{DeviceDirectory, PermissionRepository};
use crate::resolver;

/// Application service for grant CRUD and cascade resolution.
pub struct PermissionService<R, D> {
    repo: R,
    directory: D,
}

impl<R: PermissionRepository, D: DeviceDirectory> PermissionService<R, D> {
    /// Create a new service backed by the given repository and directory.
    pub fn new(repo: R, directory: D) -> Self {
        Self { repo, directory }
    }

    /// Store a grant and its freshly expanded cascade.
    ///
    /// # Errors
    ///
    /// Returns [`LuxhubError::Validation`] for an empty value,
    /// [`LuxhubError::PermissionResolutionFailed`] when the directory
    /// snapshot cannot be fetched (the grant is not stored), or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self), fields(user = %user, kind = %kind))]
    pub async fn grant(
        &self,
        user: UserId,
        kind: GrantKind,
        value: &str,
    ) -> Result<ResolvedPermissionSet, LuxhubError> {
        let grant = PermissionGrant::new(user, kind, value)?;
        let snapshot = self.fetch_for_resolution().await?;

        let mut grants = self.repo.grants_for(user).await?;
        if !grants.contains(&grant) {
            grants.push(grant.clone());
        }
        let resolved = cascade(&grants, &snapshot);
        self.repo.save_grant(&grant, &resolved).await?;
        tracing::info!(devices = resolved.devices.len(), groups = resolved.groups.len(), "grant saved");
        Ok(resolved)
    }

    /// Remove a grant and re-expand the remaining cascade.
    ///
    /// # Errors
    ///
    /// Returns [`LuxhubError::PermissionResolutionFailed`] when the
    /// directory snapshot cannot be fetched (the grant stays in place), or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self), fields(user = %user, kind = %kind))]
    pub async fn revoke(
        &self,
        user: UserId,
        kind: GrantKind,
        value: &str,
    ) -> Result<ResolvedPermissionSet, LuxhubError> {
        let grant = PermissionGrant::new(user, kind, value)?;
        let snapshot = self.fetch_for_resolution().await?;

        let grants: Vec<PermissionGrant> = self
            .repo
            .grants_for(user)
            .await?
            .into_iter()
            .filter(|g| g != &grant)
            .collect();
        let resolved = cascade(&grants, &snapshot);
        self.repo.remove_grant(&grant, &resolved).await?;
        Ok(resolved)
    }

    /// All grants for a user.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_grants(&self, user: UserId) -> Result<Vec<PermissionGrant>, LuxhubError> {
        self.repo.grants_for(user).await
    }

    /// The user's resolved permission set.
    ///
    /// Reads the cascade persisted at the last save. When no cascade was
    /// ever saved (grants written by an older schema), it is re-derived
    /// lazily — and if the directory is unreachable at that point the
    /// result is the *empty* set, never a guess.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn resolved(&self, user: UserId) -> Result<ResolvedPermissionSet, LuxhubError> {
        if let Some(resolved) = self.repo.load_resolved(user).await? {
            return Ok(resolved);
        }

        let grants = self.repo.grants_for(user).await?;
        if grants.is_empty() {
            return Ok(ResolvedPermissionSet::default());
        }

        match self.directory.fetch_snapshot().await {
            Ok(snapshot) => {
                let resolved = cascade(&grants, &snapshot);
                self.repo.save_resolved(user, &resolved).await?;
                Ok(resolved)
            }
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "lazy cascade derive failed, treating as empty");
                Ok(ResolvedPermissionSet::default())
            }
        }
    }

    async fn fetch_for_resolution(&self) -> Result<DirectorySnapshot, LuxhubError> {
        self.directory
            .fetch_snapshot()
            .await
            .map_err(|err| LuxhubError::PermissionResolutionFailed(Box::new(err)))
    }
}

/// Expand grants into concrete labels against one snapshot.
///
/// Cascade rule: a device grant contributes exactly that device label; a
/// group grant contributes the group plus every device currently in it; a
/// scene grant contributes the scene, every device referenced by its target
/// states, and every group those devices belong to.
#[must_use]
pub fn cascade(grants: &[PermissionGrant], snapshot: &DirectorySnapshot) -> ResolvedPermissionSet {
    let mut resolved = ResolvedPermissionSet::default();

    for grant in grants {
        match grant.kind {
            GrantKind::Device => resolved.allow_device(&grant.value),
            GrantKind::Group => {
                resolved.allow_group(&grant.value);
                if let Some(group) = snapshot.group_by_label(&grant.value) {
                    for id in &group.device_ids {
                        if let Some(device) = snapshot.device(id) {
                            resolved.allow_device(&device.label);
                        }
                    }
                }
            }
            GrantKind::Scene => {
                resolved.allow_scene(&grant.value);
                let Some(scene) = snapshot
                    .scenes
                    .iter()
                    .find(|s| s.label.eq_ignore_ascii_case(&grant.value))
                else {
                    continue;
                };
                for state in &scene.states {
                    let Ok(targets) = resolver::resolve(&state.selector, snapshot) else {
                        continue;
                    };
                    for target in targets {
                        if let Some(device) = snapshot.device(&target.device) {
                            resolved.allow_device(&device.label);
                            if let Some(group) = &device.group {
                                resolved.allow_group(&group.label);
                            }
                        }
                    }
                }
            }
        }
    }

    resolved
}
