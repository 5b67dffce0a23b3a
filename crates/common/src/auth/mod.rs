//! Credential types and storage.
//!
//! The SIVICOS backend issues a pair of opaque bearer credentials on login:
//! an access token attached to every API call and a refresh token used to
//! rotate the access token when it expires. Both are treated as opaque
//! strings here; the client never inspects their contents.
//!
//! # Module Organization
//!
//! - [`types`]: `TokenPair` plus the auth endpoint response formats
//! - [`storage`]: the `TokenStore` trait and the file-backed implementation

pub mod storage;
pub mod types;

pub use storage::{FileTokenStore, TokenStore};
pub use types::{LoginResponse, RefreshResponse, TokenPair};
