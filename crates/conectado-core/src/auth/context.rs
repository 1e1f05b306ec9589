//! In-memory session state exposed to the UI.
//!
//! `SessionContext` is created once per application instance and owned by
//! it. Construction rehydrates from the `SessionStore`; `login` and `logout`
//! delegate to the store and queue `SessionEffect`s (navigation and
//! notifications) for the UI to apply.

use tracing::{info, warn};

use crate::models::{Credentials, User};

use super::{AuthError, SessionStore};

/// Lifecycle of the in-memory session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Before rehydration has run
    Initializing,
    Authenticated,
    Unauthenticated,
}

/// Screens the session can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Side effects produced by session transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    Navigate(Route),
    Notify(Notice),
}

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login realizado!";
pub const LOGOUT_MESSAGE: &str = "Você saiu";

pub struct SessionContext {
    store: SessionStore,
    state: SessionState,
    user: Option<User>,
    is_loading: bool,
    effects: Vec<SessionEffect>,
}

impl SessionContext {
    /// Create the context and rehydrate it from storage.
    pub fn new(store: SessionStore) -> Self {
        let mut context = Self {
            store,
            state: SessionState::Initializing,
            user: None,
            is_loading: true,
            effects: Vec::new(),
        };
        context.rehydrate();
        context
    }

    fn rehydrate(&mut self) {
        self.user = self.store.current_user();
        self.state = if self.user.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };
        self.is_loading = false;
        info!(state = ?self.state, "Session rehydrated");
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// True iff a user is held in memory
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// True only while `login` is awaiting the backend. Callers holding the
    /// context cannot observe it mid-login; a UI that must render a loading
    /// state keeps its own pending flag across the await.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Token for authenticated API requests
    pub fn token(&self) -> Option<String> {
        self.store.token()
    }

    /// Log in and, on success, queue navigation to the dashboard.
    ///
    /// Calls are not serialized; a second login simply replaces the first.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let credentials = Credentials::new(email, password);
        if !credentials.is_complete() {
            let err = AuthError::MissingCredentials;
            self.effects.push(SessionEffect::Notify(Notice::error(err.user_message())));
            return Err(err);
        }

        self.is_loading = true;
        let result = self.store.login(&credentials).await;
        self.is_loading = false;

        match result {
            Ok(info) => {
                info!(email = %info.user.email, "Login successful");
                self.user = Some(info.user);
                self.state = SessionState::Authenticated;
                self.effects.push(SessionEffect::Notify(Notice::success(LOGIN_SUCCESS_MESSAGE)));
                self.effects.push(SessionEffect::Navigate(Route::Dashboard));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.effects.push(SessionEffect::Notify(Notice::error(e.user_message())));
                Err(e)
            }
        }
    }

    /// Log out and queue navigation to the login screen.
    ///
    /// The in-memory session is cleared even if storage cannot be updated.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.logout() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.user = None;
        self.state = SessionState::Unauthenticated;
        self.effects.push(SessionEffect::Notify(Notice::info(LOGOUT_MESSAGE)));
        self.effects.push(SessionEffect::Navigate(Route::Login));
        info!("Logged out");
    }

    /// Take all queued effects, oldest first
    pub fn drain_effects(&mut self) -> Vec<SessionEffect> {
        std::mem::take(&mut self.effects)
    }
}
