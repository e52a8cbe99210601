//! # luxhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `luxhub-app::ports::storage`
//! - Manage the `SQLite` connection pool lifecycle
//! - Run embedded migrations and seed the admin/guest users
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `luxhub-app` (for port traits) and `luxhub-domain` (for domain
//! types). The `app` and `domain` crates must never reference this adapter.

pub mod permission_repo;
pub mod pool;
pub mod user_repo;

pub use permission_repo::SqlitePermissionRepository;
pub use pool::{Config, Database};
pub use user_repo::SqliteUserRepository;
