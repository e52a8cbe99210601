//! # luxhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceDirectory` — read the cloud device/scene directory snapshot
//!   - `DeviceCommander` — dispatch write operations to the device cloud
//!   - `PermissionRepository` / `UserRepository` — durable grants and accounts
//!   - `Assistant` — the language-model collaborator proposing candidate batches
//! - Provide the **core use-cases**:
//!   - `resolver` — selector → authorized device set resolution
//!   - `PermissionService` — grant management with save-time cascade expansion
//!   - `authorization` — read-time filtering and write-time enforcement
//!   - `ActivationTracker` — the scene activation state machine
//!   - `CommandExecutor` — partial-failure batch execution
//!   - `Reconciler` — the periodic snapshot/scene-status poll
//!
//! ## Dependency rule
//! Depends on `luxhub-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod activation;
pub mod authorization;
pub mod executor;
pub mod permission_service;
pub mod ports;
pub mod reconciler;
pub mod resolver;
