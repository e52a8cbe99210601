//! # luxhub-adapter-assistant
//!
//! Language-model adapter — implements the `Assistant` port over the
//! Anthropic messages API.
//!
//! ## Responsibilities
//! - Build the system prompt with the caller's *visible* device/scene
//!   context embedded
//! - Call the messages API and decode the returned JSON batch (stripping
//!   markdown code fences some models wrap it in)
//! - Surface the batch as raw proposals; validation and authorization
//!   happen in the application core, never here
//!
//! ## Dependency rule
//! Depends on `luxhub-app` (for the port) and `luxhub-domain`.

pub mod client;
pub mod config;
pub mod error;
pub mod prompt;

pub use client::AnthropicAssistant;
pub use config::AssistantConfig;
pub use error::AssistantError;
