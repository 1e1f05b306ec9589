//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use conectado_core::auth::Route;

use crate::app::{can_add_email_char, can_add_password_char, App, AppState, LoginFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match app.screen {
        Route::Login => handle_login_input(app, key),
        Route::Dashboard => handle_dashboard_input(app, key),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // The form is frozen while a login is in flight
    if app.login_pending {
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                app.submit_login();
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {
                // Ignore character input on button
            }
        },
        _ => {}
    }
    Ok(false)
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('u') => {
            app.refresh_background();
        }
        KeyCode::Char('l') => {
            app.logout();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next_school();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev_school();
        }
        KeyCode::Home => {
            app.school_selection = 0;
        }
        KeyCode::End => {
            let count = app.snapshot.as_ref().map(|s| s.schools.len()).unwrap_or(0);
            app.school_selection = count.saturating_sub(1);
        }
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use conectado_core::models::DashboardSnapshot;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_login_form_typing_and_focus() {
        let (_dir, _storage, mut app) = test_app();

        type_text(&mut app, "ana@escola.br");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "pw 1");
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.login_email, "ana@escola.br");
        assert_eq!(app.login_password, "pw ");
        assert_eq!(app.login_focus, LoginFocus::Password);

        press(&mut app, KeyCode::Enter);
        assert!(app.login_pending);
    }

    #[test]
    fn test_login_form_ignores_input_while_pending() {
        let (_dir, _storage, mut app) = test_app();
        app.login_pending = true;

        type_text(&mut app, "abc");
        assert!(!press(&mut app, KeyCode::Esc));

        assert!(app.login_email.is_empty());
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_escape_on_login_quits() {
        let (_dir, _storage, mut app) = test_app();
        assert!(press(&mut app, KeyCode::Esc));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_enter_on_email_moves_to_password() {
        let (_dir, _storage, mut app) = test_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.login_focus, LoginFocus::Password);
        assert!(!app.login_pending);
    }

    #[test]
    fn test_quit_confirmation() {
        let (_dir, _storage, mut app) = test_app();
        app.screen = Route::Dashboard;

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('s')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_toggle() {
        let (_dir, _storage, mut app) = test_app();
        app.screen = Route::Dashboard;

        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.state, AppState::ShowingHelp);
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.state, AppState::ShowingHelp);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_dashboard_navigation() {
        let (_dir, _storage, mut app) = test_app();
        app.screen = Route::Dashboard;
        app.snapshot = Some(DashboardSnapshot::sample());

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.school_selection, 2);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.school_selection, 1);
        press(&mut app, KeyCode::End);
        assert_eq!(app.school_selection, 4);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.school_selection, 0);
    }

    #[test]
    fn test_logout_key_returns_to_login() {
        let (_dir, _storage, mut app) = test_app();
        app.screen = Route::Dashboard;
        app.snapshot = Some(DashboardSnapshot::sample());

        press(&mut app, KeyCode::Char('l'));

        assert_eq!(app.screen, Route::Login);
        assert!(app.snapshot.is_none());
    }
}
