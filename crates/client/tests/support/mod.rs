//! Shared helpers for integration tests.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use sivicos_client::{ApiClient, ClientConfig, SessionObserver};
use sivicos_common::testing::MemoryTokenStore;
use sivicos_common::TokenPair;
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Install the test log subscriber, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Build a client against the mock server with the given credentials
/// already loaded, sharing the store with the caller for assertions.
pub async fn client_with_tokens(
    server: &MockServer,
    pair: TokenPair,
) -> (ApiClient, Arc<MemoryTokenStore>) {
    init_tracing();
    let store = Arc::new(MemoryTokenStore::with_tokens(pair));
    let config = ClientConfig::new(server.uri());
    let client = ApiClient::new(&config, store.clone()).expect("client should build");
    client.session().initialize().await.expect("initialize should succeed");
    (client, store)
}

/// Counts session-expiry notifications.
#[derive(Default)]
pub struct ExpiryCounter {
    count: AtomicUsize,
}

impl ExpiryCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl SessionObserver for ExpiryCounter {
    fn session_expired(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
