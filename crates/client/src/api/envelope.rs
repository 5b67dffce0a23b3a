//! Request and response envelopes.
//!
//! Callers describe one outbound call with [`ApiRequest`]; every response
//! comes back as an [`ApiResponse`], whether the backend body was already
//! shaped that way or a bare payload.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ApiError;

/// Caller-supplied description of one outbound call.
///
/// `path` is relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a request with the given method and relative path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, headers: Vec::new() }
    }

    /// Shorthand for a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// Shorthand for a PUT request with a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    /// Shorthand for a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an extra header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Pagination metadata reported by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

/// Uniform response shape returned to callers.
///
/// Backends that already answer with any of `data`/`meta`/`message`/`error`
/// pass through unchanged; bare payloads are wrapped as `{ "data": raw }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// Normalize a response body into the envelope shape.
    ///
    /// Idempotent: normalizing an already-shaped body returns the same
    /// envelope, never a double-wrapped one. A `null` body becomes an empty
    /// envelope.
    ///
    /// # Errors
    /// Returns [`ApiError::Parse`] if a shaped body carries a malformed
    /// `meta` block.
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        if body.is_null() {
            return Ok(Self::default());
        }

        if is_enveloped(&body) {
            return serde_json::from_value(body).map_err(|err| ApiError::Parse(err.to_string()));
        }

        Ok(Self { data: Some(body), ..Self::default() })
    }

    /// Deserialize the `data` payload into a concrete type.
    ///
    /// # Errors
    /// Returns [`ApiError::Parse`] if no payload is present or it does not
    /// match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let data = self.data.clone().ok_or_else(|| {
            ApiError::Parse("response envelope carries no data payload".to_string())
        })?;
        serde_json::from_value(data).map_err(|err| ApiError::Parse(err.to_string()))
    }
}

/// A body is already enveloped when it is an object carrying at least one of
/// the four envelope keys.
fn is_enveloped(body: &Value) -> bool {
    body.as_object().is_some_and(|obj| {
        ["data", "meta", "message", "error"].iter().any(|key| obj.contains_key(*key))
    })
}
