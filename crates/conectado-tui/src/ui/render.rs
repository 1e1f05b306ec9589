use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use conectado_core::auth::Route;

use crate::app::{App, AppState, LoginFocus};

use super::{dashboard, styles};

pub const APP_TITLE: &str = "Dashboard Nordeste Conectado";
pub const MOCK_HINT: &str = "Entre com qualquer email e senha";

/// Width of the visible part of the login inputs
const FIELD_WIDTH: usize = 28;

pub fn render(frame: &mut Frame, app: &App) {
    match app.screen {
        Route::Login => render_login_screen(frame, app),
        Route::Dashboard => render_dashboard_screen(frame, app),
    }

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_dashboard_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    dashboard::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let left = vec![
        Line::from(Span::styled("  Dashboard Censo Escolar", styles::title_style())),
        Line::from(Span::styled("  Escolas Rurais do Nordeste", styles::muted_style())),
    ];
    frame.render_widget(Paragraph::new(left), halves[0]);

    let (name, email) = app
        .session
        .user()
        .map(|u| (u.name.as_str(), u.email.as_str()))
        .unwrap_or(("", ""));
    let right = vec![
        Line::from(vec![
            Span::styled(name.to_string(), styles::value_style()),
            Span::raw("  "),
            Span::styled("[l] Sair ", styles::help_key_style()),
        ]),
        Line::from(vec![
            Span::styled(email.to_string(), styles::muted_style()),
            Span::raw("          "),
        ]),
    ];
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), halves[1]);
}

fn render_login_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(frame.area());

    let height = if app.active_notice().is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(50, height, chunks[0]);

    let mut lines = vec![
        Line::from(Span::styled(APP_TITLE, styles::title_style())),
        Line::from(""),
    ];

    if app.is_mock() {
        lines.push(Line::from(Span::styled(MOCK_HINT, styles::muted_style())));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));

    let email_focused = app.login_focus == LoginFocus::Email;
    lines.push(field_line("E-mail: ", &app.login_email, email_focused));

    let masked = "*".repeat(app.login_password.chars().count());
    let password_focused = app.login_focus == LoginFocus::Password;
    lines.push(field_line("Senha:  ", &masked, password_focused));

    lines.push(Line::from(""));
    lines.push(button_line(app));

    // Error message
    if let Some(notice) = app.active_notice() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice.message.clone(),
            styles::notice_style(notice.level),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
    render_status_bar(frame, app, chunks[1]);
}

/// A labelled input showing the tail of its value
fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let skip = value.chars().count().saturating_sub(FIELD_WIDTH - 1);
    let visible: String = value.chars().skip(skip).collect();
    let cursor = if focused { "▌" } else { " " };
    let shown = format!("{}{}", visible, cursor);
    let padded = format!("{:<width$}", shown, width = FIELD_WIDTH);

    Line::from(vec![
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(padded, style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(app: &App) -> Line<'static> {
    let focused = app.login_focus == LoginFocus::Button;
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let label = match (app.login_pending, focused) {
        (true, _) => "  Entrando...  ",
        (false, true) => "  ▶ Entrar ◀  ",
        (false, false) => "    Entrar    ",
    };

    Line::from(vec![
        Span::raw("["),
        Span::styled(label, style),
        Span::raw("]"),
    ])
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.screen {
        Route::Login => "[Tab] próximo campo | [Enter] entrar | [Esc] fechar ",
        Route::Dashboard => "[u] atualizar | [?] ajuda | [q] fechar ",
    };

    let left = match app.active_notice() {
        // The login screen shows its notice inside the form
        Some(notice) if app.screen == Route::Dashboard => Span::styled(
            format!(" {} ", notice.message),
            styles::notice_style(notice.level),
        ),
        _ => match (&app.screen, &app.cache_age) {
            (Route::Dashboard, Some(age)) => {
                Span::styled(format!(" Atualizado {} ", age), styles::muted_style())
            }
            _ => Span::styled(
                format!(" Sessão: {} ", app.session.store().backend_name()),
                styles::muted_style(),
            ),
        },
    };

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(left)).style(styles::status_bar_style()),
        halves[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(shortcuts, styles::muted_style())))
            .style(styles::status_bar_style())
            .alignment(Alignment::Right),
        halves[1],
    );
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(52, 20, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(format!(" {}", APP_TITLE), styles::title_style())),
        Line::from(Span::styled(
            format!(" versão {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navegação", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", styles::help_key_style()),
            Span::styled("Percorrer a lista de escolas", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Home/End  ", styles::help_key_style()),
            Span::styled("Primeira/última escola", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Ações", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  u         ", styles::help_key_style()),
            Span::styled("Atualizar os dados", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  l         ", styles::help_key_style()),
            Span::styled("Sair da sessão", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Fechar o aplicativo", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Ctrl+C    ", styles::help_key_style()),
            Span::styled("Fechar imediatamente", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Pressione ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" ou ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" para fechar", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Ajuda ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Deseja realmente fechar?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Pressione ", styles::muted_style()),
            Span::styled("[S]", styles::help_key_style()),
            Span::styled(" para fechar, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" para cancelar", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
