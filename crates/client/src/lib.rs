//! Authenticated API client for the SIVICOS community-health backend.
//!
//! Every SIVICOS frontend (the admin dashboard, CLI tooling) reaches the
//! backend through this crate. All business rules live server-side; this
//! client performs HTTP calls, attaches the bearer credential, and recovers
//! transparently from access-token expiry.
//!
//! # Architecture
//!
//! - [`config`]: environment-first configuration with file fallback
//! - [`http`]: thin `reqwest` wrapper (timeouts, defaults, no retries)
//! - [`api`]: the API client itself, with request envelopes, the error
//!   taxonomy, and the session lifecycle with single-flight refresh
//!
//! # Refresh protocol
//!
//! A request that is rejected with 401 asks the session for a credential
//! newer than the one the backend refused. The refresh cycle is strictly
//! single-flight: concurrent rejected callers await the same refresh rather
//! than racing to rotate the refresh credential server-side. Each request is
//! replayed at most once; a failed refresh ends the session for every
//! waiting caller at once.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod config;
pub mod http;

// Re-export commonly used items
pub use api::client::ApiClient;
pub use api::envelope::{ApiRequest, ApiResponse, PageMeta};
pub use api::errors::ApiError;
pub use api::session::{SessionManager, SessionObserver};
pub use config::ClientConfig;
