//! REST API client module for the census dashboard backend.
//!
//! This module provides the `ApiClient` for the login endpoint and the five
//! read-only aggregated query endpoints under `/dashboard`.
//!
//! Authenticated requests carry the session token as a bearer token.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
