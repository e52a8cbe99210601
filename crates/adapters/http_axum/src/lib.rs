//! # luxhub-adapter-http-axum
//!
//! HTTP adapter — the axum router exposing the lighting API.
//!
//! ## Responsibilities
//! - Resolve request identity from the `x-luxhub-user` header (the login
//!   flow itself is an external collaborator)
//! - Expose lights, scenes, scene status, grants, and the
//!   natural-language endpoint
//! - Map domain errors to HTTP statuses; denials are `403`, distinct from
//!   device failures (`502`) and quota exhaustion (`429`)
//!
//! ## Dependency rule
//! Depends on `luxhub-app` (for services and ports) and `luxhub-domain`.

pub mod api;
pub mod error;
pub mod identity;
pub mod router;
pub mod state;
