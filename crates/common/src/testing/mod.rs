//! Test doubles for deterministic tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::auth::storage::TokenStore;
use crate::auth::types::TokenPair;
use crate::error::StorageError;

/// In-memory [`TokenStore`] for tests.
///
/// Behaves like the file-backed store without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a credential pair.
    #[must_use]
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self { tokens: Mutex::new(Some(tokens)) }
    }

    fn guard(&self) -> MutexGuard<'_, Option<TokenPair>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenPair>, StorageError> {
        Ok(self.guard().clone())
    }

    async fn save(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        *self.guard() = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.guard() = None;
        Ok(())
    }
}
