//! Connection pool setup, migrations, and seed users.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use luxhub_domain::error::LuxhubError;

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:luxhub.db?mode=rwc`).
    pub database_url: String,
}

/// An initialised database: pool built, migrations run, seed users present.
pub struct Database {
    pool: SqlitePool,
}

impl Config {
    /// Connect, migrate, and seed.
    ///
    /// A user named `admin` (role admin) and the shared `guest` user (role
    /// guest, natural language disabled) are guaranteed to exist afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LuxhubError::Storage`] when the pool cannot be built or a
    /// migration fails.
    pub async fn build(&self) -> Result<Database, LuxhubError> {
        // An in-memory database exists per connection, so the pool must
        // stay at one connection for it to behave like one database.
        let max_connections = if self.database_url.contains(":memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&self.database_url)
            .await
            .map_err(LuxhubError::storage)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(LuxhubError::storage)?;

        seed_users(&pool).await?;

        Ok(Database { pool })
    }
}

impl Database {
    /// Access the underlying pool for constructing repositories.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn seed_users(pool: &SqlitePool) -> Result<(), LuxhubError> {
    sqlx::query(
        "INSERT INTO users (username, role, nlp_enabled) VALUES ('admin', 'admin', 1)
         ON CONFLICT (username) DO NOTHING",
    )
    .execute(pool)
    .await
    .map_err(LuxhubError::storage)?;

    sqlx::query(
        "INSERT INTO users (username, role, nlp_enabled) VALUES ('guest', 'guest', 0)
         ON CONFLICT (username) DO NOTHING",
    )
    .execute(pool)
    .await
    .map_err(LuxhubError::storage)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_build_in_memory_database_with_seed_users() {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 2);
    }

    #[tokio::test]
    async fn should_be_idempotent_across_rebuilds() {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();

        // Re-running seed against an already seeded pool changes nothing.
        seed_users(db.pool()).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 2);
    }
}
