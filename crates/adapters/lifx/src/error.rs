//! LIFX adapter error types.

use luxhub_domain::error::{LuxhubError, RateLimitedError};

/// Errors specific to the LIFX adapter.
#[derive(Debug, thiserror::Error)]
pub enum LifxError {
    /// Transport-level failure (DNS, TLS, timeout).
    #[error("LIFX request failed")]
    Http(#[source] reqwest::Error),

    /// Non-success HTTP status from the cloud.
    #[error("LIFX API returned {status}")]
    Status {
        status: u16,
        body: String,
    },

    /// The cloud rejected the request for quota reasons, or the local
    /// budget is exhausted.
    #[error("LIFX quota exhausted, retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// Response body did not decode as the expected JSON.
    #[error("failed to decode LIFX response")]
    Decode(#[source] reqwest::Error),
}

impl From<LifxError> for LuxhubError {
    fn from(err: LifxError) -> Self {
        match err {
            LifxError::RateLimited { retry_after_secs } => {
                LuxhubError::RateLimited(RateLimitedError { retry_after_secs })
            }
            other => LuxhubError::DeviceUnreachable(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_rate_limit_into_domain_taxonomy() {
        let err: LuxhubError = LifxError::RateLimited {
            retry_after_secs: 30,
        }
        .into();
        assert!(matches!(err, LuxhubError::RateLimited(_)));
    }

    #[test]
    fn should_map_status_errors_to_device_unreachable() {
        let err: LuxhubError = LifxError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        }
        .into();
        assert!(matches!(err, LuxhubError::DeviceUnreachable(_)));
    }
}
