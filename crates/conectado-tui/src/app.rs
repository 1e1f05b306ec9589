//! Application state management for the Conectado dashboard.
//!
//! This module contains the core `App` struct that owns the session context,
//! the dashboard cache and the UI state, and coordinates background loads of
//! the dashboard snapshot.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use conectado_core::api::ApiClient;
use conectado_core::auth::{
    AuthBackend, AuthError, HttpAuthBackend, MockAuthBackend, Notice, Route, SessionContext,
    SessionEffect, SessionStore,
};
use conectado_core::cache::CacheManager;
use conectado_core::config::Config;
use conectado_core::models::DashboardSnapshot;
use conectado_core::source::{ApiSource, DashboardSource, SampleSource};
use conectado_core::storage::{FileStore, KeyValueStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for e-mail input.
const MAX_EMAIL_LENGTH: usize = 100;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// How long a notification stays in the status bar.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

// ============================================================================
// UI State Types
// ============================================================================

/// Overlay and lifecycle state on top of the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from the background dashboard load back to the app.
enum RefreshResult {
    Dashboard(DashboardSnapshot),
    Error(String),
}

/// A load result tagged with the session generation that started it.
struct RefreshMessage {
    generation: u64,
    result: RefreshResult,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    /// Where the config is saved; `None` keeps it in memory only
    config_path: Option<PathBuf>,
    pub session: SessionContext,
    pub cache: CacheManager,
    /// Unauthenticated client; `None` runs the app on sample data
    api: Option<ApiClient>,
    sample_delay: Duration,

    // UI State
    pub state: AppState,
    pub screen: Route,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    /// The UI's login loading flag. Set when the form is submitted; the main
    /// loop draws once, then logs in
    pub login_pending: bool,

    // Dashboard state
    pub snapshot: Option<DashboardSnapshot>,
    pub dashboard_loading: bool,
    pub school_selection: usize,
    pub cache_age: Option<String>,
    /// Bumped on logout; loads started under an older value are dropped
    load_generation: u64,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshMessage>,
    refresh_tx: mpsc::Sender<RefreshMessage>,

    // Last notification and when it was raised
    notice: Option<(Notice, Instant)>,
}

impl App {
    /// Create the application from the configuration, opening the session
    /// storage and cache in the user's data and cache directories.
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir().unwrap_or_else(|_| PathBuf::from("./data"));
        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?data_dir, ?cache_dir, "Directories configured");

        let api = match config.api_base_url() {
            Some(url) => Some(
                ApiClient::new(&url).with_context(|| format!("Failed to create API client for {}", url))?,
            ),
            None => None,
        };

        let backend: Arc<dyn AuthBackend> = match &api {
            Some(api) => Arc::new(HttpAuthBackend::new(api.clone())),
            None => Arc::new(MockAuthBackend::new(
                config.mock_delay().unwrap_or(MockAuthBackend::DEFAULT_DELAY),
            )),
        };
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_dir));
        let session = SessionContext::new(SessionStore::new(storage, backend));
        let cache = CacheManager::new(cache_dir)?;

        let mut app = Self::from_parts(config, session, cache, api, SampleSource::DEFAULT_DELAY);
        app.config_path = Config::config_path().ok();
        Ok(app)
    }

    /// Assemble the application from already-built services.
    pub fn from_parts(
        config: Config,
        session: SessionContext,
        cache: CacheManager,
        api: Option<ApiClient>,
        sample_delay: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let login_email = config.default_email().unwrap_or_default();
        let screen = if session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        };
        info!(?screen, backend = session.store().backend_name(), "App created");

        let mut app = Self {
            config,
            config_path: None,
            session,
            cache,
            api,
            sample_delay,

            state: AppState::Normal,
            screen,

            login_email,
            login_password: String::new(),
            login_focus: LoginFocus::Email,
            login_pending: false,

            snapshot: None,
            dashboard_loading: false,
            school_selection: 0,
            cache_age: None,
            load_generation: 0,

            refresh_rx: rx,
            refresh_tx: tx,

            notice: None,
        };
        if app.screen == Route::Login {
            app.start_login();
        }
        app
    }

    /// True when logins go to the mock backend
    pub fn is_mock(&self) -> bool {
        self.api.is_none()
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Show the login screen with a fresh form
    pub fn start_login(&mut self) {
        self.screen = Route::Login;
        self.login_password.clear();
        self.login_pending = false;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
    }

    /// Queue a login; ignored while one is already pending
    pub fn submit_login(&mut self) {
        if !self.login_pending {
            self.login_pending = true;
        }
    }

    /// Log in with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<(), AuthError> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        let result = self.session.login(&email, &password).await;
        self.login_pending = false;

        if result.is_ok() {
            self.login_password.clear();
            self.config.last_email = Some(email);
            self.save_config();
        }

        self.apply_session_effects();
        result
    }

    /// Interactive login on the plain terminal (used for `--login`)
    pub async fn login_interactive(&mut self) -> Result<()> {
        println!("\n=== Dashboard Nordeste Conectado ===\n");

        let email = match self.config.default_email() {
            Some(last) => {
                print!("E-mail [{}]: ", last);
                io::stdout().flush()?;
                let input = Self::read_line()?;
                if input.is_empty() {
                    last
                } else {
                    input
                }
            }
            None => {
                print!("E-mail: ");
                io::stdout().flush()?;
                Self::read_line()?
            }
        };
        let password = rpassword::prompt_password("Senha: ")?;

        println!("\nEntrando...");
        self.login_email = email;
        self.login_password = password;
        let result = self.attempt_login().await;

        if let Some(notice) = self.active_notice() {
            println!("{}", notice.message);
        }
        result.map_err(|e| anyhow::anyhow!(e.user_message()))
    }

    fn save_config(&self) {
        if let Some(ref path) = self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "Failed to save config");
            }
        }
    }

    fn read_line() -> Result<String> {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Log out, drop the cached dashboard and return to the login screen
    pub fn logout(&mut self) {
        self.session.logout();
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear dashboard cache");
        }
        self.load_generation += 1;
        self.dashboard_loading = false;
        self.snapshot = None;
        self.cache_age = None;
        self.school_selection = 0;
        self.apply_session_effects();
    }

    /// Apply the navigation and notifications queued by the session
    pub fn apply_session_effects(&mut self) {
        for effect in self.session.drain_effects() {
            match effect {
                SessionEffect::Navigate(Route::Login) => self.start_login(),
                SessionEffect::Navigate(Route::Dashboard) => {
                    self.screen = Route::Dashboard;
                    self.load_dashboard();
                }
                SessionEffect::Notify(notice) => self.notify(notice),
            }
        }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn notify(&mut self, notice: Notice) {
        debug!(level = ?notice.level, message = %notice.message, "Notice");
        self.notice = Some((notice, Instant::now()));
    }

    /// The last notification, unless it has expired
    pub fn active_notice(&self) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|(_, at)| at.elapsed() < NOTICE_TTL)
            .map(|(notice, _)| notice)
    }

    // =========================================================================
    // Dashboard Data
    // =========================================================================

    /// Source for the next load, carrying the current session token
    pub fn dashboard_source(&self) -> Arc<dyn DashboardSource> {
        match &self.api {
            Some(api) => {
                let api = match self.session.token() {
                    Some(token) => api.with_token(token),
                    None => api.clone(),
                };
                Arc::new(ApiSource::new(api))
            }
            None => Arc::new(SampleSource::new(self.sample_delay)),
        }
    }

    /// Show the cached snapshot, then refresh in the background if stale
    pub fn load_dashboard(&mut self) {
        match self.cache.load_dashboard() {
            Ok(Some(cached)) => {
                self.cache_age = Some(cached.age_display());
                let stale = cached.is_stale();
                self.set_snapshot(cached.data);
                if !stale {
                    debug!("Using cached dashboard");
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load cached dashboard"),
        }
        self.refresh_background();
    }

    /// Spawn a background task to reload the dashboard
    pub fn refresh_background(&mut self) {
        if self.dashboard_loading {
            debug!("Dashboard load already in progress");
            return;
        }
        self.dashboard_loading = true;

        let source = self.dashboard_source();
        let tx = self.refresh_tx.clone();
        let generation = self.load_generation;
        info!(source = source.name(), generation, "Starting dashboard load");

        tokio::spawn(async move {
            let result = match source.load().await {
                Ok(snapshot) => RefreshResult::Dashboard(snapshot),
                Err(e) => RefreshResult::Error(format!("{:#}", e)),
            };
            if let Err(e) = tx.send(RefreshMessage { generation, result }).await {
                error!(error = %e, "Failed to send refresh result - channel closed");
            }
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(message) = self.refresh_rx.try_recv() {
            self.process_refresh_result(message);
        }
    }

    fn process_refresh_result(&mut self, message: RefreshMessage) {
        if message.generation != self.load_generation {
            debug!(
                generation = message.generation,
                current = self.load_generation,
                "Discarding dashboard load from an earlier session"
            );
            return;
        }

        self.dashboard_loading = false;
        match message.result {
            RefreshResult::Dashboard(snapshot) => {
                if let Err(e) = self.cache.save_dashboard(&snapshot) {
                    warn!(error = %e, "Failed to cache dashboard");
                }
                self.cache_age = self.cache.dashboard_age();
                self.set_snapshot(snapshot);
            }
            RefreshResult::Error(msg) => {
                error!(error = %msg, "Dashboard load failed");
                self.notify(Notice::error("Falha ao carregar os dados do painel"));
            }
        }
    }

    fn set_snapshot(&mut self, snapshot: DashboardSnapshot) {
        let rows = snapshot.schools.len();
        self.snapshot = Some(snapshot);
        self.school_selection = self.school_selection.min(rows.saturating_sub(1));
    }

    /// True while there is nothing to show yet ("Carregando...")
    pub fn is_dashboard_loading(&self) -> bool {
        self.snapshot.is_none() && self.dashboard_loading
    }

    // =========================================================================
    // School list selection
    // =========================================================================

    fn school_count(&self) -> usize {
        self.snapshot.as_ref().map(|s| s.schools.len()).unwrap_or(0)
    }

    pub fn select_next_school(&mut self) {
        let max = self.school_count().saturating_sub(1);
        self.school_selection = (self.school_selection + 1).min(max);
    }

    pub fn select_prev_school(&mut self) {
        self.school_selection = self.school_selection.saturating_sub(1);
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an e-mail character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
