//! Common foundation types for the SIVICOS API client.
//!
//! This crate contains:
//! - Credential types (`TokenPair` and the auth endpoint wire formats)
//! - Durable credential storage (`TokenStore` trait, file-backed impl)
//! - Test doubles for deterministic tests (`testing::MemoryTokenStore`)
//!
//! ## Architecture
//! - No dependency on other SIVICOS crates
//! - Credentials are opaque bearer strings; claims decoding is a caller
//!   concern and deliberately not provided here

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod auth;
pub mod error;
pub mod testing;

// Re-export commonly used items
pub use auth::storage::{FileTokenStore, TokenStore};
pub use auth::types::{LoginResponse, RefreshResponse, TokenPair};
pub use error::StorageError;
