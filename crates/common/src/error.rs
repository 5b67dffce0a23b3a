//! Error types for credential storage.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::auth::storage::TokenStore`] implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read credential file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to write credential file {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("failed to delete credential file {path}: {message}")]
    Delete { path: PathBuf, message: String },

    #[error("invalid credential file {path}: {message}")]
    Format { path: PathBuf, message: String },

    #[error("no credential storage path could be determined")]
    NoStoragePath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path_and_message() {
        let err = StorageError::Read {
            path: PathBuf::from("/tmp/tokens.json"),
            message: "permission denied".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("/tmp/tokens.json"));
        assert!(rendered.contains("permission denied"));
    }

    #[test]
    fn no_storage_path_display() {
        let err = StorageError::NoStoragePath;
        assert!(err.to_string().contains("storage path"));
    }
}
