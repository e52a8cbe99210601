//! Assistant adapter error types.

use luxhub_domain::error::LuxhubError;

/// Errors specific to the assistant adapter.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Transport-level failure.
    #[error("assistant request failed")]
    Http(#[source] reqwest::Error),

    /// Non-success HTTP status from the API.
    #[error("assistant API returned {status}")]
    Status {
        status: u16,
        body: String,
    },

    /// The completion contained no text block.
    #[error("assistant returned an empty completion")]
    EmptyCompletion,

    /// The completion text did not parse as a batch.
    #[error("failed to parse assistant response: {raw:?}")]
    Parse {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<AssistantError> for LuxhubError {
    fn from(err: AssistantError) -> Self {
        LuxhubError::DeviceUnreachable(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_into_domain_taxonomy() {
        let err: LuxhubError = AssistantError::EmptyCompletion.into();
        assert!(matches!(err, LuxhubError::DeviceUnreachable(_)));
    }
}
