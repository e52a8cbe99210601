//! # luxhub-adapter-lifx
//!
//! LIFX cloud adapter — implements the `DeviceDirectory` and
//! `DeviceCommander` ports over the LIFX HTTP API.
//!
//! ## Responsibilities
//! - Fetch the full device/scene directory (`GET /lights/all`, `GET /scenes`)
//! - Dispatch write operations (`PUT …/state`, `POST …/toggle`,
//!   `PUT /scenes/scene_id:{uuid}/activate`) with bearer-token auth
//! - Track the remaining request quota from `X-RateLimit-*` response
//!   headers and fail fast when it is exhausted
//! - Map wire DTOs to domain types
//!
//! ## Dependency rule
//! Depends on `luxhub-app` (for port traits) and `luxhub-domain`.

pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::LifxClient;
pub use config::LifxConfig;
pub use error::LifxError;
