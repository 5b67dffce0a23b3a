//! SIVICOS API client.
//!
//! This module provides the HTTP-based client for the SIVICOS REST backend.
//! It handles bearer-credential injection, response envelope normalization,
//! and transparent recovery from authorization failure.
//!
//! # Architecture
//!
//! - Uses the crate-level `HttpClient` (no direct `reqwest` in callers)
//! - Single-flight credential refresh shared by concurrent callers
//! - Uniform response envelope regardless of backend body shape
//! - Structured tracing only (no `println!`)

pub mod client;
pub mod envelope;
pub mod errors;
pub mod session;

pub use client::ApiClient;
pub use envelope::{ApiRequest, ApiResponse, PageMeta};
pub use errors::ApiError;
pub use session::{SessionManager, SessionObserver};
