//! `SQLite` implementation of the `UserRepository` port.

use sqlx::{Row, SqlitePool};

use luxhub_app::ports::UserRepository;
use luxhub_domain::error::{LuxhubError, NotFoundError};
use luxhub_domain::id::UserId;
use luxhub_domain::user::{Role, User};

/// Reads accounts from the `users` table.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a repository over the given pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, LuxhubError> {
    let id: i64 = row.try_get("id").map_err(LuxhubError::storage)?;
    let username: String = row.try_get("username").map_err(LuxhubError::storage)?;
    let role: String = row.try_get("role").map_err(LuxhubError::storage)?;
    let nlp_enabled: i64 = row.try_get("nlp_enabled").map_err(LuxhubError::storage)?;

    let role = match role.as_str() {
        "admin" => Role::Admin,
        "guest" => Role::Guest,
        // The CHECK constraint leaves only 'named'.
        _ => Role::Named,
    };

    Ok(User {
        id: UserId::new(id),
        username,
        role,
        nlp_enabled: nlp_enabled != 0,
    })
}

impl UserRepository for SqliteUserRepository {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, LuxhubError> {
        let row = sqlx::query("SELECT id, username, role, nlp_enabled FROM users WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(LuxhubError::storage)?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, LuxhubError> {
        let row =
            sqlx::query("SELECT id, username, role, nlp_enabled FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(LuxhubError::storage)?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn guest(&self) -> Result<User, LuxhubError> {
        let row =
            sqlx::query("SELECT id, username, role, nlp_enabled FROM users WHERE role = 'guest'")
                .fetch_optional(&self.pool)
                .await
                .map_err(LuxhubError::storage)?;
        match row {
            Some(row) => row_to_user(&row),
            None => Err(NotFoundError {
                entity: "User",
                id: "guest".to_string(),
            }
            .into()),
        }
    }

    async fn list(&self) -> Result<Vec<User>, LuxhubError> {
        let rows =
            sqlx::query("SELECT id, username, role, nlp_enabled FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(LuxhubError::storage)?;
        rows.iter().map(row_to_user).collect()
    }
}
