use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{Credentials, SessionInfo, User};
use crate::storage::{KeyValueStore, StorageError, StorageKey};

use super::{AuthBackend, AuthError};

/// Storage key holding the session token
pub const TOKEN_KEY: &str = "auth_token";

/// Storage key holding the serialized user
pub const USER_KEY: &str = "user";

fn token_key() -> StorageKey<String> {
    StorageKey::<String>::text(TOKEN_KEY)
}

fn user_key() -> StorageKey<User> {
    StorageKey::<User>::json(USER_KEY)
}

/// Durable session state: the token and the user record.
///
/// This is the only component that touches persistent storage. Token and
/// user are written as two separate entries, token first; readers tolerate
/// either one being present without the other.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    backend: Arc<dyn AuthBackend>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, backend: Arc<dyn AuthBackend>) -> Self {
        Self { storage, backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Authenticate and persist the new session, replacing any previous one.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionInfo, AuthError> {
        let info = self.backend.authenticate(credentials).await?;

        token_key().write(self.storage.as_ref(), &info.token)?;
        if let Err(e) = user_key().write(self.storage.as_ref(), &info.user) {
            // A failed login must not leave a token behind
            if let Err(clear_err) = token_key().clear(self.storage.as_ref()) {
                warn!(error = %clear_err, "Failed to roll back session token");
            }
            return Err(e.into());
        }

        info!(email = %info.user.email, backend = self.backend.name(), "Session stored");
        Ok(info)
    }

    /// Remove both session entries. Safe to call with no session.
    pub fn logout(&self) -> Result<(), StorageError> {
        token_key().clear(self.storage.as_ref())?;
        user_key().clear(self.storage.as_ref())?;
        debug!("Session cleared");
        Ok(())
    }

    /// The stored user, or `None` if missing or malformed
    pub fn current_user(&self) -> Option<User> {
        user_key().read(self.storage.as_ref())
    }

    /// The stored token, if non-empty
    pub fn token(&self) -> Option<String> {
        token_key().read(self.storage.as_ref())
    }

    /// True iff a token is stored. The user record and token validity are not checked.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
