//! Conectado - a terminal dashboard for rural school connectivity in the
//! Brazilian Northeast, built on school census data.
//!
//! Log in (any credentials work against the mock backend), then browse the
//! summary cards, charts and school list.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use conectado_core::auth::Route;
use conectado_core::config::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "conectado.log";

const USAGE: &str = "Uso: conectado [--login | --logout | --dump-dashboard]";

/// Initialize the tracing subscriber, writing to a daily log file so the
/// terminal UI stays clean. Returns the guard that flushes the writer.
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Could not create log directory {}: {}", log_dir.display(), e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load_or_default();
    let log_dir = config
        .cache_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("./cache"))
        .join("logs");
    let _log_guard = init_tracing(&log_dir);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None => {}
        Some("--login") => return login_command(config).await,
        Some("--logout") => return logout_command(config),
        Some("--dump-dashboard") => return dump_dashboard(config).await,
        Some(other) => {
            eprintln!("Opção desconhecida: {}\n{}", other, USAGE);
            std::process::exit(2);
        }
    }

    info!("Conectado starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;
    if app.screen == Route::Dashboard {
        app.load_dashboard();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Erro: {}", e);
    }

    info!("Conectado shutting down");
    Ok(())
}

/// Prompt for credentials on the terminal and store the session
async fn login_command(config: Config) -> Result<()> {
    let mut app = App::new(config)?;
    app.login_interactive().await
}

/// Clear the stored session
fn logout_command(config: Config) -> Result<()> {
    let mut app = App::new(config)?;
    let was_authenticated = app.session.is_authenticated();
    app.logout();

    if was_authenticated {
        println!("Você saiu");
    } else {
        println!("Nenhuma sessão ativa");
    }
    Ok(())
}

/// Load the dashboard once and print it to stdout as JSON
async fn dump_dashboard(config: Config) -> Result<()> {
    let app = App::new(config)?;
    if !app.session.is_authenticated() {
        warn!("Dumping dashboard without a stored session");
    }

    let source = app.dashboard_source();
    eprintln!("Carregando dados ({})...", source.name());
    let snapshot = source.load().await?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // A submitted login runs after the frame showing "Entrando..."
        if app.login_pending {
            // Failures reach the user through the session notice
            if let Err(e) = app.attempt_login().await {
                debug!(error = %e, "Login attempt failed");
            }
            continue;
        }

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ignore key releases on platforms that report them
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
