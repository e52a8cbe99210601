//! # luxhub-domain
//!
//! Pure domain model for the luxhub lighting gateway.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (read-only snapshots of cloud-owned lights)
//! - Define **Scenes** (named presets with per-device target states)
//! - Define **Selectors** (the closed target-expression variant and its wire grammar)
//! - Define **Users** and **Permission Grants** (label-based, with cascade results)
//! - Define **Commands** (the closed set of device operations and their outcomes)
//! - Contain the scene state matcher and all invariant enforcement
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod device;
pub mod directory;
pub mod matcher;
pub mod scene;
pub mod selector;
pub mod user;
