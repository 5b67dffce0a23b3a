//! Authenticated API client.
//!
//! Performs HTTP calls against the backend base URL, attaches the current
//! access credential, and recovers transparently from authorization failure
//! without duplicating refresh work or losing in-flight requests.

use std::sync::Arc;

use reqwest::{header, Response, StatusCode};
use serde_json::Value;
use sivicos_common::{FileTokenStore, TokenStore};
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::http::HttpClient;

use super::envelope::{ApiRequest, ApiResponse};
use super::errors::{backend_message, ApiError};
use super::session::SessionManager;

/// API client for the SIVICOS backend.
///
/// Callers share one instance per backend: the refresh protocol's shared
/// state (refresh gate, credential cache) lives in the session manager.
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    /// Create a client from configuration and a credential store.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .user_agent(format!("sivicos-client/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let session = Arc::new(SessionManager::new(http.clone(), base_url.clone(), store));

        Ok(Self { http, base_url, session })
    }

    /// Create a client whose credentials persist in the configured file,
    /// falling back to the platform default location when
    /// `config.token_path` is unset.
    ///
    /// # Errors
    /// Returns [`ApiError::Storage`] if no storage path can be determined,
    /// [`ApiError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let store = match &config.token_path {
            Some(path) => FileTokenStore::new(path.clone()),
            None => FileTokenStore::at_default_path()?,
        };
        Self::new(config, Arc::new(store))
    }

    /// The session manager (login, logout, observer registration).
    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Authenticate and store the issued credential pair.
    ///
    /// # Errors
    /// See [`SessionManager::login`].
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<sivicos_common::TokenPair, ApiError> {
        self.session.login(identifier, secret).await
    }

    /// End the session, best-effort informing the backend.
    ///
    /// # Errors
    /// See [`SessionManager::logout`].
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.logout().await
    }

    /// Whether a non-empty access credential is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Send one request and normalize the response.
    ///
    /// On a first 401 the access credential is refreshed (single-flight
    /// across concurrent callers) and the request replayed once with the new
    /// credential; a 401 on the replay is a terminal [`ApiError::Auth`].
    /// Any other non-2xx surfaces as [`ApiError::Transport`], never retried.
    ///
    /// # Errors
    /// [`ApiError::Transport`], [`ApiError::Auth`], [`ApiError::Network`],
    /// or [`ApiError::Parse`] per the taxonomy in [`super::errors`].
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = self.session.access_token().await;
        let response = self.execute(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::into_envelope(response).await;
        }

        // First rejection for this request: ask the session for a
        // credential newer than the refused one. At most one replay.
        let Some(rejected) = token else {
            return Err(ApiError::Auth(
                "request rejected and no credential is stored".to_string(),
            ));
        };
        let fresh = self.session.refreshed_token(&rejected).await?;

        debug!(path = %request.path, "replaying request with refreshed credential");
        let response = self.execute(&request, Some(&fresh)).await?;

        // A second 401 maps to a terminal auth error below.
        Self::into_envelope(response).await
    }

    /// Shorthand for `request(ApiRequest::get(path))`.
    ///
    /// # Errors
    /// See [`Self::request`].
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::get(path)).await
    }

    /// Shorthand for a POST with a JSON body.
    ///
    /// # Errors
    /// See [`Self::request`].
    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::post(path, body)).await
    }

    /// Shorthand for a PUT with a JSON body.
    ///
    /// # Errors
    /// See [`Self::request`].
    pub async fn put(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::put(path, body)).await
    }

    /// Shorthand for a DELETE.
    ///
    /// # Errors
    /// See [`Self::request`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(ApiRequest::delete(path)).await
    }

    async fn execute(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        self.http.send(builder).await
    }

    async fn into_envelope(response: Response) -> Result<ApiResponse, ApiError> {
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        if status == StatusCode::UNAUTHORIZED {
            let message = body
                .as_ref()
                .and_then(backend_message)
                .unwrap_or_else(|| "request rejected with 401".to_string());
            return Err(ApiError::Auth(message));
        }

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(backend_message)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| format!("status {status}"));
            return Err(ApiError::Transport { status: status.as_u16(), message });
        }

        match body {
            Some(value) => ApiResponse::from_body(value),
            // 204 and friends carry no body.
            None if text.trim().is_empty() => Ok(ApiResponse::default()),
            None => Err(ApiError::Parse(format!("response body is not JSON: {text}"))),
        }
    }
}
