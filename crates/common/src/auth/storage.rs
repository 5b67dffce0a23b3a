//! Durable credential storage.
//!
//! Reads/writes a single JSON document holding both credentials (0600 on
//! Unix). Both values are always stored and removed together: a half-cleared
//! pair must never survive a logout or a failed refresh.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StorageError;

use super::types::TokenPair;

/// Persistent key/value storage for the credential pair.
///
/// Implementations must store and remove both credentials atomically with
/// respect to each other. The trait is object-safe so the session layer can
/// be injected with mocks in tests.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored pair, or `None` if no credentials are saved.
    async fn load(&self) -> Result<Option<TokenPair>, StorageError>;

    /// Persist the pair, replacing any previous one.
    async fn save(&self, tokens: &TokenPair) -> Result<(), StorageError>;

    /// Remove both credentials. Removing an empty store is not an error.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// File-backed [`TokenStore`].
///
/// Default location is `<config dir>/sivicos/tokens.json`, shared between
/// the desktop dashboard and CLI tooling so a login in one is picked up by
/// the other.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the platform default location.
    ///
    /// # Errors
    /// Returns [`StorageError::NoStoragePath`] if no config directory can be
    /// determined for the current user.
    pub fn at_default_path() -> Result<Self, StorageError> {
        Ok(Self { path: Self::default_path().ok_or(StorageError::NoStoragePath)? })
    }

    /// Platform default path for the credential file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sivicos/tokens.json"))
    }

    /// Path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenPair>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Read { path: self.path.clone(), message: err.to_string() })
            }
        };

        let tokens: TokenPair = serde_json::from_str(&contents).map_err(|err| {
            StorageError::Format { path: self.path.clone(), message: err.to_string() }
        })?;

        Ok(Some(tokens))
    }

    async fn save(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| StorageError::Write {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        }

        let contents = serde_json::to_string_pretty(tokens).map_err(|err| {
            StorageError::Format { path: self.path.clone(), message: err.to_string() }
        })?;

        std::fs::write(&self.path, contents).map_err(|err| StorageError::Write {
            path: self.path.clone(),
            message: err.to_string(),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).map_err(
                |err| StorageError::Write { path: self.path.clone(), message: err.to_string() },
            )?;
        }

        tracing::debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "credentials cleared");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(StorageError::Delete { path: self.path.clone(), message: err.to_string() })
            }
        }
    }
}
