//! Error types for log loading and insight generation.
//!
//! `DataFormatError` covers everything that can go wrong while coercing the
//! interaction log into a typed table; `InsightError` covers the Gemini call
//! boundary. Aggregation never fails: an empty table is a valid state, not
//! an error.

use std::path::PathBuf;
use thiserror::Error;

/// A load attempt failed because a column would not coerce (or the file was
/// structurally broken).
///
/// Fatal to that load attempt only, never to the process. The loader never
/// caches a partially coerced table.
#[derive(Debug, Error)]
pub enum DataFormatError {
    /// Structurally malformed CSV: unreadable file, missing column, wrong
    /// field count, broken quoting.
    #[error("malformed log {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A `timestamp` value matched none of the accepted formats.
    #[error("row {row}: unparseable timestamp {value:?}")]
    Timestamp { row: usize, value: String },

    /// A `durasi_detik` value was not a finite, non-negative number.
    #[error("row {row}: invalid duration {value:?} (expected non-negative seconds)")]
    Duration { row: usize, value: String },

    /// A `rak` value was blank after trimming.
    #[error("row {row}: blank shelf id")]
    ShelfId { row: usize },
}

/// A failure of the on-demand insight request.
///
/// Every variant is recoverable and reportable: the caller renders the
/// outcome and the process continues normally.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The table had no records; the network call was suppressed.
    #[error("no interaction data to analyze")]
    EmptyData,

    /// The configured environment variable held no API key. Fails the call,
    /// never the process; there is no fallback credential.
    #[error("missing API key: set {var} to enable insight requests")]
    MissingApiKey { var: String },

    /// The service rejected the credential.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// Quota or rate limit exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other non-success status from the service.
    #[error("service error {status}: {message}")]
    Service { status: u16, message: String },

    /// The request did not complete within the configured timeout.
    #[error("insight request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Connection-level failure before any response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// A success status whose body carried no candidate text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The data sample could not be serialized into the prompt.
    #[error("failed to serialize data sample: {0}")]
    Sample(String),
}

impl InsightError {
    /// Classify a non-success HTTP status into the matching variant.
    ///
    /// Gemini reports an invalid API key as `400 INVALID_ARGUMENT`, so a 400
    /// whose message names the key is treated as an auth rejection.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::AuthRejected(message),
            429 => Self::QuotaExceeded(message),
            400 if message.to_ascii_lowercase().contains("api key") => {
                Self::AuthRejected(message)
            }
            _ => Self::Service { status, message },
        }
    }

    /// True for the expected empty-table condition: a warning, not a failure.
    pub fn is_empty_data(&self) -> bool {
        matches!(self, Self::EmptyData)
    }

    /// Short classification string for log fields.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::EmptyData => "empty_data",
            Self::MissingApiKey { .. } => "missing_api_key",
            Self::AuthRejected(_) => "auth_rejected",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::Service { .. } => "service_error",
            Self::Timeout { .. } => "timeout",
            Self::Network(_) => "network_error",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Sample(_) => "sample_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_maps_auth_codes() {
        assert!(matches!(
            InsightError::from_status(401, "unauthorized".into()),
            InsightError::AuthRejected(_)
        ));
        assert!(matches!(
            InsightError::from_status(403, "forbidden".into()),
            InsightError::AuthRejected(_)
        ));
    }

    #[test]
    fn from_status_maps_quota() {
        assert!(matches!(
            InsightError::from_status(429, "resource exhausted".into()),
            InsightError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn bad_api_key_on_400_is_auth() {
        let err = InsightError::from_status(
            400,
            "API key not valid. Please pass a valid API key.".into(),
        );
        assert!(matches!(err, InsightError::AuthRejected(_)));
    }

    #[test]
    fn other_statuses_are_service_errors() {
        assert!(matches!(
            InsightError::from_status(400, "bad request".into()),
            InsightError::Service { status: 400, .. }
        ));
        assert!(matches!(
            InsightError::from_status(500, "internal".into()),
            InsightError::Service { status: 500, .. }
        ));
        assert!(matches!(
            InsightError::from_status(503, "unavailable".into()),
            InsightError::Service { status: 503, .. }
        ));
    }

    #[test]
    fn empty_data_is_a_warning() {
        assert!(InsightError::EmptyData.is_empty_data());
        assert!(!InsightError::Network("tcp".into()).is_empty_data());
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(InsightError::EmptyData.error_kind(), "empty_data");
        assert_eq!(
            InsightError::Timeout { seconds: 60 }.error_kind(),
            "timeout"
        );
        assert_eq!(
            InsightError::MissingApiKey { var: "GEMINI_API_KEY".into() }.error_kind(),
            "missing_api_key"
        );
    }

    #[test]
    fn duration_error_names_row_and_value() {
        let err = DataFormatError::Duration {
            row: 3,
            value: "abc".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("row 3"));
        assert!(rendered.contains("abc"));
    }
}
