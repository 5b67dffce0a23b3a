//! Integration tests for session login and logout.

mod support;

use std::sync::Arc;

use serde_json::json;
use sivicos_client::{ApiClient, ApiError, ClientConfig};
use sivicos_common::testing::MemoryTokenStore;
use sivicos_common::{FileTokenStore, TokenPair, TokenStore};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{client_with_tokens, init_tracing};

#[tokio::test]
async fn login_stores_issued_credentials() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"identifier": "admin", "secret": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let config = ClientConfig::new(server.uri());
    let client = ApiClient::new(&config, store.clone()).expect("client should build");

    let pair = client.login("admin", "hunter2").await.expect("login should succeed");
    assert_eq!(pair, TokenPair::new("access-1", "refresh-1"));

    assert!(client.is_authenticated().await);
    let persisted = store.load().await.expect("store should be readable");
    assert_eq!(persisted, Some(pair));
}

#[tokio::test]
async fn configured_token_path_receives_credentials() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir should be created");
    let token_path = dir.path().join("tokens.json");

    let mut config = ClientConfig::new(server.uri());
    config.token_path = Some(token_path.clone());

    let client = ApiClient::from_config(&config).expect("client should build");
    client.login("admin", "hunter2").await.expect("login should succeed");

    // The pair lands at the configured path, readable by a fresh store.
    let store = FileTokenStore::new(token_path);
    let persisted = store.load().await.expect("store should be readable");
    assert_eq!(persisted, Some(TokenPair::new("access-1", "refresh-1")));
}

#[tokio::test]
async fn rejected_login_stores_nothing() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "credenciales inválidas"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let config = ClientConfig::new(server.uri());
    let client = ApiClient::new(&config, store.clone()).expect("client should build");

    let err = client.login("admin", "wrong").await.expect_err("login must fail");
    match err {
        ApiError::Auth(message) => assert_eq!(message, "credenciales inválidas"),
        other => panic!("expected auth error, got {other:?}"),
    }

    assert!(!client.is_authenticated().await);
    assert_eq!(store.load().await.expect("store should be readable"), None);
}

#[tokio::test]
async fn logout_informs_backend_and_clears_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(body_json(json!({"refreshToken": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_tokens(&server, TokenPair::new("access-1", "refresh-1")).await;

    client.logout().await.expect("logout should succeed");
    assert!(!client.is_authenticated().await);
    assert_eq!(store.load().await.expect("store should be readable"), None);
}

#[tokio::test]
async fn logout_clears_credentials_even_when_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_tokens(&server, TokenPair::new("access-1", "refresh-1")).await;

    client.logout().await.expect("logout is best-effort");
    assert!(!client.is_authenticated().await);
    assert_eq!(store.load().await.expect("store should be readable"), None);
}

#[tokio::test]
async fn logout_without_session_is_a_no_op() {
    init_tracing();
    let server = MockServer::start().await;
    // No mock for /auth/logout: the backend must not be called.

    let store = Arc::new(MemoryTokenStore::new());
    let config = ClientConfig::new(server.uri());
    let client = ApiClient::new(&config, store).expect("client should build");

    client.logout().await.expect("logout without a session should succeed");
    assert!(!client.is_authenticated().await);
}
