//! Common error types used across the workspace.
//!
//! The taxonomy is deliberately small: selector problems are rejected and
//! never retried, authorization failures are fail-closed, device/network
//! failures are recorded per operation, and quota exhaustion fails fast.
//! Each layer defines its own typed errors and converts via `#[from]` or
//! by boxing into the IO-shaped variants.

use crate::id::DeviceId;

/// Base error enum for luxhub.
#[derive(Debug, thiserror::Error)]
pub enum LuxhubError {
    /// Malformed or unresolvable target expression. Rejected, not retried.
    #[error("invalid selector")]
    InvalidSelector(#[from] SelectorError),

    /// The user lacks a grant for any of the addressed devices.
    /// Rejected, logged, never retried.
    #[error("permission denied")]
    PermissionDenied(#[from] PermissionDeniedError),

    /// A grant cascade could not be computed because the device directory
    /// was unavailable. The grant save is rejected; existing grants stay.
    #[error("permission resolution failed")]
    PermissionResolutionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A device-cloud call failed. Recorded per operation; batches continue.
    #[error("device cloud unreachable")]
    DeviceUnreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The device-cloud request quota is exhausted. New dispatches fail fast.
    #[error("rate limited")]
    RateLimited(#[from] RateLimitedError),

    /// Persistence-layer failure.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons a selector fails to parse or resolve.
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    /// The wire expression does not match the grammar.
    #[error("malformed selector: {input:?}")]
    Malformed {
        /// The offending wire expression.
        input: String,
    },

    /// A referenced device id is absent from the directory snapshot.
    #[error("unknown device: {0}")]
    UnknownDevice(DeviceId),

    /// A referenced group id is absent from the directory snapshot.
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    /// A referenced scene id is absent from the directory snapshot.
    #[error("unknown scene: {0}")]
    UnknownScene(String),

    /// A label matched no device or group in the snapshot.
    #[error("unknown label: {0:?}")]
    UnknownLabel(String),

    /// A zone range lies outside the addressed device's zone count.
    #[error("zone range {start}-{end} out of bounds for {device} ({zones} zones)")]
    ZoneOutOfBounds {
        device: DeviceId,
        start: u16,
        end: u16,
        /// Zone count reported by the device, 0 when not multizone.
        zones: u16,
    },

    /// An operation kind outside the supported closed set.
    #[error("unsupported operation kind: {0:?}")]
    UnsupportedOperation(String),
}

/// Details of a write-time authorization rejection.
#[derive(Debug, thiserror::Error)]
#[error("user {username:?} may not control {selector:?}")]
pub struct PermissionDeniedError {
    /// The requesting user.
    pub username: String,
    /// The selector (wire form) that was denied.
    pub selector: String,
}

/// A referenced record does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Human-readable record kind (`"User"`, `"Scene"`, …).
    pub entity: &'static str,
    /// Identifier that failed to resolve.
    pub id: String,
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A name/label field was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A unit-interval value was outside [0, 1].
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange {
        field: &'static str,
        value: f64,
    },

    /// A grant value (label) was empty.
    #[error("grant value must not be empty")]
    EmptyGrantValue,

    /// A grant kind outside device/group/scene.
    #[error("unknown grant kind: {0:?}")]
    UnknownGrantKind(String),

    /// A state change carried nothing to apply.
    #[error("state change must set at least one of power, color, brightness")]
    EmptyStateChange,
}

/// Quota exhaustion, with the collaborator-reported reset time.
#[derive(Debug, thiserror::Error)]
#[error("device cloud quota exhausted, retry after {retry_after_secs}s")]
pub struct RateLimitedError {
    /// Seconds until the quota window resets.
    pub retry_after_secs: u64,
}

impl LuxhubError {
    /// Box an arbitrary error into the [`Storage`](Self::Storage) variant.
    pub fn storage<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Storage(Box::new(err))
    }

    /// Box an arbitrary error into [`DeviceUnreachable`](Self::DeviceUnreachable).
    pub fn unreachable<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::DeviceUnreachable(Box::new(err))
    }
}
