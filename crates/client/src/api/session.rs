//! Session lifecycle: login, logout, and credential refresh.
//!
//! The session owns the credential pair exclusively. Concurrent requests
//! whose access credential is rejected all converge on one refresh cycle:
//! the refresh gate serializes rejected callers, the first one performs the
//! refresh call, and the rest observe the rotated credential when they
//! acquire the gate. A failed refresh tears the whole session down for every
//! waiting caller at once.

use std::sync::{Arc, PoisonError, RwLock as StdRwLock};

use reqwest::Method;
use serde_json::{json, Value};
use sivicos_common::{LoginResponse, RefreshResponse, TokenPair, TokenStore};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::http::HttpClient;

use super::errors::{backend_message, ApiError};

/// Hook invoked when the session ends fatally (failed refresh).
///
/// The embedding UI registers an observer to navigate to its login view;
/// this is the client-side rendition of "redirect the user agent to the
/// login entry point". Fired exactly once per fatal failure, no matter how
/// many callers were waiting on the refresh.
pub trait SessionObserver: Send + Sync {
    fn session_expired(&self);
}

/// Credential lifecycle manager.
///
/// One instance per [`crate::ApiClient`]; all shared mutable state of the
/// refresh protocol lives here.
pub struct SessionManager {
    http: HttpClient,
    base_url: String,
    store: Arc<dyn TokenStore>,
    tokens: RwLock<Option<TokenPair>>,
    refresh_gate: Mutex<()>,
    observer: StdRwLock<Option<Arc<dyn SessionObserver>>>,
}

impl SessionManager {
    /// Create a session manager against the given backend base URL.
    #[must_use]
    pub fn new(http: HttpClient, base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            store,
            tokens: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            observer: StdRwLock::new(None),
        }
    }

    /// Load previously persisted credentials into memory.
    ///
    /// Should be called on startup. Returns `true` if credentials were
    /// found.
    ///
    /// # Errors
    /// Returns [`ApiError::Storage`] if the store cannot be read.
    pub async fn initialize(&self) -> Result<bool, ApiError> {
        match self.store.load().await? {
            Some(pair) => {
                *self.tokens.write().await = Some(pair);
                info!("session initialized with stored credentials");
                Ok(true)
            }
            None => {
                debug!("no stored credentials found");
                Ok(false)
            }
        }
    }

    /// Register the expiry observer, replacing any previous one.
    pub fn set_observer(&self, observer: Arc<dyn SessionObserver>) {
        *self.observer.write().unwrap_or_else(PoisonError::into_inner) = Some(observer);
    }

    /// Authenticate against the backend and take ownership of the issued
    /// credential pair.
    ///
    /// # Errors
    /// Returns [`ApiError::Auth`] on a rejected login (nothing is stored),
    /// [`ApiError::Network`] on transport failure.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<TokenPair, ApiError> {
        let url = format!("{}/auth/login", self.base_url);
        let body = json!({ "identifier": identifier, "secret": secret });

        let response = self.http.send(self.http.request(Method::POST, &url).json(&body)).await?;

        if !response.status().is_success() {
            return Err(ApiError::Auth(failure_text(response, "login rejected").await));
        }

        let parsed: LoginResponse =
            response.json().await.map_err(|err| ApiError::Parse(err.to_string()))?;
        let pair: TokenPair = parsed.into();

        self.install_tokens(pair.clone()).await?;
        info!("login successful");
        Ok(pair)
    }

    /// End the session.
    ///
    /// The backend is informed on a best-effort basis so it can invalidate
    /// the refresh credential server-side; local credentials are cleared
    /// unconditionally, even if that call fails.
    ///
    /// # Errors
    /// Returns [`ApiError::Storage`] only if the durable store cannot be
    /// cleared; backend failures are logged and ignored.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let refresh_token =
            self.tokens.read().await.as_ref().map(|pair| pair.refresh_token.clone());

        if let Some(refresh_token) = refresh_token {
            let url = format!("{}/auth/logout", self.base_url);
            let body = json!({ "refreshToken": refresh_token });
            match self.http.send(self.http.request(Method::POST, &url).json(&body)).await {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "backend rejected logout, clearing local session anyway");
                }
                Err(err) => {
                    warn!(error = %err, "logout call failed, clearing local session anyway");
                }
                Ok(_) => {}
            }
        }

        self.discard_tokens().await?;
        info!("logged out");
        Ok(())
    }

    /// Whether a non-empty access credential is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.as_ref().is_some_and(TokenPair::has_access_token)
    }

    /// Current access credential, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|pair| pair.access_token.clone())
    }

    /// Obtain an access credential newer than `rejected`.
    ///
    /// This is the single-flight refresh cycle. Callers whose request was
    /// refused with 401 land here; the refresh gate serializes them. The
    /// first caller performs `POST /auth/refresh`; the rest acquire the gate
    /// after it settles and observe the outcome without issuing a second
    /// refresh call.
    ///
    /// # Errors
    /// Returns [`ApiError::Auth`] if the refresh fails or the session was
    /// already torn down by a concurrent failed refresh. On refresh failure
    /// both credentials are cleared and the expiry observer fires once.
    pub(crate) async fn refreshed_token(&self, rejected: &str) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        let (current, refresh_token) = match self.tokens.read().await.as_ref() {
            Some(pair) => (pair.access_token.clone(), pair.refresh_token.clone()),
            // A concurrent refresh already failed and ended the session.
            None => return Err(ApiError::Auth("session expired".to_string())),
        };

        // The caller holding the gate before us already rotated the
        // credential; resume with it.
        if current != rejected {
            return Ok(current);
        }

        debug!("access credential rejected, refreshing");
        match self.execute_refresh(&refresh_token).await {
            Ok(access_token) => {
                let pair = TokenPair::new(access_token.clone(), refresh_token);
                if let Err(err) = self.install_tokens(pair).await {
                    // The session stays usable in memory; durability is
                    // restored on the next successful login.
                    warn!(error = %err, "failed to persist refreshed credentials");
                }
                info!("access credential refreshed");
                Ok(access_token)
            }
            Err(err) => {
                warn!(error = %err, "credential refresh failed, ending session");
                if let Err(store_err) = self.discard_tokens().await {
                    warn!(error = %store_err, "failed to clear stored credentials");
                }
                self.notify_expired();
                Err(ApiError::Auth(format!("credential refresh failed: {err}")))
            }
        }
    }

    /// Perform the refresh call itself. Any non-2xx is a refresh failure;
    /// the caller escalates every failure to a terminal auth error.
    async fn execute_refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        if refresh_token.is_empty() {
            return Err(ApiError::Auth("no refresh credential available".to_string()));
        }

        let url = format!("{}/auth/refresh", self.base_url);
        let body = json!({ "refreshToken": refresh_token });

        let response = self.http.send(self.http.request(Method::POST, &url).json(&body)).await?;

        let status = response.status();
        if !status.is_success() {
            let message = failure_text(response, "refresh rejected").await;
            return Err(ApiError::Transport { status: status.as_u16(), message });
        }

        let parsed: RefreshResponse =
            response.json().await.map_err(|err| ApiError::Parse(err.to_string()))?;
        Ok(parsed.access_token)
    }

    /// Take ownership of a new pair: memory first so in-flight callers see
    /// it immediately, then the durable store.
    async fn install_tokens(&self, pair: TokenPair) -> Result<(), ApiError> {
        *self.tokens.write().await = Some(pair.clone());
        self.store.save(&pair).await?;
        Ok(())
    }

    /// Destroy both credentials everywhere.
    async fn discard_tokens(&self) -> Result<(), ApiError> {
        *self.tokens.write().await = None;
        self.store.clear().await?;
        Ok(())
    }

    fn notify_expired(&self) {
        let observer =
            self.observer.read().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(observer) = observer {
            observer.session_expired();
        }
    }
}

/// Pull the backend-provided failure text out of an error response.
async fn failure_text(response: reqwest::Response, fallback: &str) -> String {
    let status = response.status();
    response
        .text()
        .await
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        .and_then(|body| backend_message(&body))
        .unwrap_or_else(|| format!("{fallback} (status {status})"))
}

#[cfg(test)]
mod tests {
    use sivicos_common::testing::MemoryTokenStore;

    use super::*;

    fn manager_with(store: Arc<MemoryTokenStore>) -> SessionManager {
        SessionManager::new(HttpClient::new().unwrap(), "http://localhost:1", store)
    }

    #[tokio::test]
    async fn initialize_loads_stored_credentials() {
        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("a1", "r1")));
        let session = manager_with(store);

        assert!(session.initialize().await.unwrap());
        assert!(session.is_authenticated().await);
        assert_eq!(session.access_token().await.as_deref(), Some("a1"));
    }

    #[tokio::test]
    async fn initialize_without_credentials() {
        let session = manager_with(Arc::new(MemoryTokenStore::new()));

        assert!(!session.initialize().await.unwrap());
        assert!(!session.is_authenticated().await);
        assert!(session.access_token().await.is_none());
    }

    #[tokio::test]
    async fn empty_access_credential_is_not_authenticated() {
        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("", "r1")));
        let session = manager_with(store);
        session.initialize().await.unwrap();

        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_normalized() {
        let session = SessionManager::new(
            HttpClient::new().unwrap(),
            "http://backend.test/",
            Arc::new(MemoryTokenStore::new()),
        );
        assert_eq!(session.base_url, "http://backend.test");
    }

    #[tokio::test]
    async fn rejected_caller_with_torn_down_session_gets_auth_error() {
        let session = manager_with(Arc::new(MemoryTokenStore::new()));
        let err = session.refreshed_token("stale").await.unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn already_rotated_credential_is_returned_without_refresh() {
        // The stored access credential differs from the rejected one, which
        // is exactly the state a queued caller observes after the first
        // caller finished refreshing. No HTTP call must happen (the base URL
        // is unroutable, so one would fail the test).
        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("fresh", "r1")));
        let session = manager_with(store);
        session.initialize().await.unwrap();

        let token = session.refreshed_token("stale").await.unwrap();
        assert_eq!(token, "fresh");
    }
}
