//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `AuthBackend`: credential verification, with mock and HTTP implementations
//! - `SessionStore`: token and user persistence in the key-value store
//! - `SessionContext`: the in-memory session state machine the UI reads
//!
//! Tokens carry no expiry; a stored token is the only proof of login.

pub mod backend;
pub mod context;
pub mod error;
pub mod store;

pub use backend::{AuthBackend, HttpAuthBackend, MockAuthBackend};
pub use context::{Notice, NoticeLevel, Route, SessionContext, SessionEffect, SessionState};
pub use error::AuthError;
pub use store::{SessionStore, TOKEN_KEY, USER_KEY};
