//! Error types for scdb-client
//!
//! Nothing here is fatal: each variant resolves to a user-visible message or a
//! degraded view of the catalog.

use thiserror::Error;

/// Client result type
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or corrupt local credentials; callers treat this as logged out
    #[error("Session invalid: {0}")]
    SessionInvalid(String),

    /// Non-success HTTP response or transport failure (no status)
    #[error("{}", fetch_failed_message(.status, .message))]
    FetchFailed {
        status: Option<u16>,
        message: String,
    },

    /// Client-side precondition not met; raised before any network call
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// One or more combinations failed during a multi-combination load
    #[error("Aggregation incomplete: {} combination(s) failed ({})", .failed.len(), .failed.join(", "))]
    PartialAggregationFailure { failed: Vec<String> },

    /// scdb-common error
    #[error("Common error: {0}")]
    Common(scdb_common::Error),
}

fn fetch_failed_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Fetch failed ({}): {}", code, message),
        None => format!("Fetch failed: {}", message),
    }
}

impl ClientError {
    pub fn fetch_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::FetchFailed {
            status,
            message: message.into(),
        }
    }

    /// HTTP status when the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::FetchFailed { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<scdb_common::Error> for ClientError {
    fn from(err: scdb_common::Error) -> Self {
        match err {
            scdb_common::Error::InvalidInput(msg) => ClientError::ValidationFailed(msg),
            other => ClientError::Common(other),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::fetch_failed(err.status().map(|s| s.as_u16()), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_validation() {
        let err: ClientError = scdb_common::Error::InvalidInput("no points".into()).into();
        assert!(matches!(err, ClientError::ValidationFailed(ref m) if m == "no points"));

        let err: ClientError = scdb_common::Error::NotFound("x".into()).into();
        assert!(matches!(err, ClientError::Common(_)));
    }

    #[test]
    fn test_display_messages() {
        let err = ClientError::fetch_failed(Some(404), "compound missing");
        assert_eq!(err.to_string(), "Fetch failed (404): compound missing");
        assert_eq!(err.status(), Some(404));

        let err = ClientError::PartialAggregationFailure {
            failed: vec!["Fe-Se".into(), "Se".into()],
        };
        assert_eq!(
            err.to_string(),
            "Aggregation incomplete: 2 combination(s) failed (Fe-Se, Se)"
        );
    }
}
