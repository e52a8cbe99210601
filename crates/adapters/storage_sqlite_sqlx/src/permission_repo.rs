//! `SQLite` implementation of the `PermissionRepository` port.
//!
//! A grant mutation and its freshly resolved cascade land in one short
//! transaction, so a stored grant is never observable without its resolved
//! set. No transaction spans a network call — the cascade is computed by
//! the caller before this adapter is involved.

use sqlx::{Row, SqlitePool};

use luxhub_app::ports::PermissionRepository;
use luxhub_domain::error::LuxhubError;
use luxhub_domain::id::UserId;
use luxhub_domain::user::{GrantKind, PermissionGrant, ResolvedPermissionSet};

/// Persists grants and resolved cascades.
pub struct SqlitePermissionRepository {
    pool: SqlitePool,
}

impl SqlitePermissionRepository {
    /// Create a repository over the given pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn replace_resolved(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user: UserId,
    resolved: &ResolvedPermissionSet,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM resolved_permissions WHERE user_id = ?")
        .bind(user.as_i64())
        .execute(&mut **tx)
        .await?;

    for (kind, labels) in [
        ("device", &resolved.devices),
        ("group", &resolved.groups),
        ("scene", &resolved.scenes),
    ] {
        for label in labels {
            sqlx::query(
                "INSERT INTO resolved_permissions (user_id, kind, label) VALUES (?, ?, ?)
                 ON CONFLICT (user_id, kind, label) DO NOTHING",
            )
            .bind(user.as_i64())
            .bind(kind)
            .bind(label)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

impl PermissionRepository for SqlitePermissionRepository {
    async fn save_grant(
        &self,
        grant: &PermissionGrant,
        resolved: &ResolvedPermissionSet,
    ) -> Result<(), LuxhubError> {
        let mut tx = self.pool.begin().await.map_err(LuxhubError::storage)?;

        sqlx::query(
            "INSERT INTO user_grants (user_id, kind, value) VALUES (?, ?, ?)
             ON CONFLICT (user_id, kind, value) DO NOTHING",
        )
        .bind(grant.user_id.as_i64())
        .bind(grant.kind.to_string())
        .bind(&grant.value)
        .execute(&mut *tx)
        .await
        .map_err(LuxhubError::storage)?;

        replace_resolved(&mut tx, grant.user_id, resolved)
            .await
            .map_err(LuxhubError::storage)?;

        tx.commit().await.map_err(LuxhubError::storage)
    }

    async fn remove_grant(
        &self,
        grant: &PermissionGrant,
        resolved: &ResolvedPermissionSet,
    ) -> Result<(), LuxhubError> {
        let mut tx = self.pool.begin().await.map_err(LuxhubError::storage)?;

        sqlx::query("DELETE FROM user_grants WHERE user_id = ? AND kind = ? AND value = ?")
            .bind(grant.user_id.as_i64())
            .bind(grant.kind.to_string())
            .bind(&grant.value)
            .execute(&mut *tx)
            .await
            .map_err(LuxhubError::storage)?;

        replace_resolved(&mut tx, grant.user_id, resolved)
            .await
            .map_err(LuxhubError::storage)?;

        tx.commit().await.map_err(LuxhubError::storage)
    }

    async fn grants_for(&self, user: UserId) -> Result<Vec<PermissionGrant>, LuxhubError> {
        let rows = sqlx::query(
            "SELECT kind, value FROM user_grants WHERE user_id = ? ORDER BY kind, value",
        )
        .bind(user.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(LuxhubError::storage)?;

        rows.iter()
            .map(|row| {
                let kind: String = row.try_get("kind").map_err(LuxhubError::storage)?;
                let value: String = row.try_get("value").map_err(LuxhubError::storage)?;
                let kind: GrantKind = kind.parse().map_err(LuxhubError::from)?;
                PermissionGrant::new(user, kind, &value)
            })
            .collect()
    }

    async fn load_resolved(
        &self,
        user: UserId,
    ) -> Result<Option<ResolvedPermissionSet>, LuxhubError> {
        let rows = sqlx::query("SELECT kind, label FROM resolved_permissions WHERE user_id = ?")
            .bind(user.as_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(LuxhubError::storage)?;

        // Every grant contributes at least its own label, so "no rows"
        // means no cascade was ever saved for this user.
        if rows.is_empty() {
            return Ok(None);
        }

        let mut resolved = ResolvedPermissionSet::default();
        for row in &rows {
            let kind: String = row.try_get("kind").map_err(LuxhubError::storage)?;
            let label: String = row.try_get("label").map_err(LuxhubError::storage)?;
            match kind.as_str() {
                "device" => resolved.allow_device(&label),
                "group" => resolved.allow_group(&label),
                "scene" => resolved.allow_scene(&label),
                _ => {}
            }
        }
        Ok(Some(resolved))
    }

    async fn save_resolved(
        &self,
        user: UserId,
        resolved: &ResolvedPermissionSet,
    ) -> Result<(), LuxhubError> {
        let mut tx = self.pool.begin().await.map_err(LuxhubError::storage)?;
        replace_resolved(&mut tx, user, resolved)
            .await
            .map_err(LuxhubError::storage)?;
        tx.commit().await.map_err(LuxhubError::storage)
    }
}
