//! API error taxonomy.
//!
//! Errors are surfaced to the calling UI code, never swallowed. The only
//! failure the client recovers from locally is a single 401 per request via
//! the refresh path; everything else propagates as one of these variants.

use serde_json::Value;
use sivicos_common::StorageError;
use thiserror::Error;

/// Errors returned by the SIVICOS API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Terminal authorization failure: a 401 on an already-replayed request,
    /// a failed refresh, or a request issued with no stored credential.
    /// Always accompanied by credential clearing when a refresh failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Non-2xx response other than a recovered 401. Carries the HTTP status
    /// and the backend-provided message verbatim; never retried.
    #[error("HTTP {status}: {message}")]
    Transport { status: u16, message: String },

    /// Transport-level failure (unreachable host, timeout); not retried.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable credential storage failed.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Whether this is a terminal authorization failure.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// HTTP status code, for transport errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Extract the backend-provided failure text from an error body.
///
/// The backend reports failures as `{"message": ...}` or `{"error": ...}`;
/// either is surfaced verbatim to the caller.
pub(crate) fn backend_message(body: &Value) -> Option<String> {
    body.as_object().and_then(|obj| {
        obj.get("message")
            .or_else(|| obj.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    })
}
