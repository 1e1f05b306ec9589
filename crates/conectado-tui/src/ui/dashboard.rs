use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, TableState,
    },
    Frame,
};

use conectado_core::models::{ChartPoint, DashboardSnapshot};
use conectado_core::utils::{format_count, format_percent, format_ratio, truncate_string, yes_no};

use crate::app::App;
use crate::ui::styles;

pub const LOADING_TEXT: &str = "Carregando...";

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = app.snapshot.as_ref() else {
        render_placeholder(frame, app, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),      // Summary cards
            Constraint::Percentage(50), // Charts
            Constraint::Min(6),         // School list
        ])
        .split(area);

    render_cards(frame, snapshot, chunks[0]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(chunks[1]);

    render_infrastructure(frame, snapshot, charts[0]);
    render_distribution(frame, snapshot, charts[1]);
    render_evolution(frame, snapshot, charts[2]);
    render_school_list(frame, app, snapshot, chunks[2]);
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.dashboard_loading {
        (LOADING_TEXT, styles::highlight_style())
    } else {
        ("Sem dados. Pressione [u] para atualizar.", styles::muted_style())
    };

    let y = area.y + area.height / 2;
    let line_area = Rect::new(area.x, y.min(area.bottom().saturating_sub(1)), area.width, 1);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, style))).alignment(Alignment::Center),
        line_area,
    );
}

fn render_cards(frame: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let cards = &snapshot.cards;
    let entries = [
        (
            "Total de Escolas Nordeste",
            format_count(cards.total_northeast_schools),
            "Todas as escolas da região",
        ),
        (
            "Escolas Área Rural",
            format_count(cards.rural_schools),
            "Escolas na zona rural",
        ),
        (
            "Escolas com Lab + Internet",
            format_count(cards.lab_and_internet_schools),
            "Laboratório e internet disponível",
        ),
        (
            "Computadores por Aluno",
            format_ratio(cards.computers_per_student),
            "Média em escolas rurais",
        ),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((title, value, description), column) in entries.into_iter().zip(columns.iter()) {
        let width = column.width.saturating_sub(4) as usize;
        let lines = vec![
            Line::from(Span::styled(value, styles::value_style())),
            Line::from(""),
            Line::from(Span::styled(truncate_string(description, width), styles::muted_style())),
        ];
        let block = Block::default()
            .title(format!(" {} ", truncate_string(title, width)))
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        frame.render_widget(Paragraph::new(lines).block(block), *column);
    }
}

fn render_infrastructure(frame: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let bars: Vec<Bar> = snapshot
        .infrastructure
        .iter()
        .map(|point| {
            Bar::default()
                .value(point.value)
                .text_value(format_count(point.value))
                .label(Line::from(point.label.clone()))
                .style(styles::series_style(0))
        })
        .collect();

    // Spread the bars over the inner width
    let count = bars.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(2) / count).saturating_sub(2).max(1);

    let chart = BarChart::default()
        .block(chart_block(" Infraestrutura por Tipo "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(2)
        .value_style(styles::value_style());

    frame.render_widget(chart, area);
}

fn render_distribution(frame: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let shares = snapshot.distribution_shares();
    let bar_space = area.width.saturating_sub(12) as usize;

    let mut lines = vec![];
    for (i, ((label, share), point)) in shares
        .iter()
        .zip(snapshot.internet_distribution.iter())
        .enumerate()
    {
        let filled = ((share / 100.0) * bar_space as f64).round() as usize;
        lines.push(Line::from(vec![
            Span::styled(label.clone(), styles::series_style(i)),
            Span::styled(format!("  {}", format_count(point.value)), styles::muted_style()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("█".repeat(filled.min(bar_space)), styles::series_style(i)),
            Span::styled(format!(" {}", format_percent(*share)), styles::value_style()),
        ]));
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("Sem dados", styles::muted_style())));
    }

    let paragraph = Paragraph::new(lines).block(chart_block(" Distribuição de Internet "));
    frame.render_widget(paragraph, area);
}

fn render_evolution(frame: &mut Frame, snapshot: &DashboardSnapshot, area: Rect) {
    let series = &snapshot.computer_evolution;
    let points = line_points(series);
    let max = series.iter().map(|p| p.value).max().unwrap_or(0);
    let y_max = (max as f64 * 1.1).max(1.0);

    let dataset = Dataset::default()
        .name("Computadores")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(styles::series_style(0))
        .data(&points);

    let x_labels: Vec<Span> = series
        .iter()
        .map(|p| Span::styled(p.label.clone(), styles::muted_style()))
        .collect();
    let y_labels = vec![
        Span::styled("0", styles::muted_style()),
        Span::styled(format_count(max / 2), styles::muted_style()),
        Span::styled(format_count(max), styles::muted_style()),
    ];

    let chart = Chart::new(vec![dataset])
        .block(chart_block(" Evolução de Computadores "))
        .x_axis(
            Axis::default()
                .bounds([0.0, series.len().saturating_sub(1).max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(Axis::default().bounds([0.0, y_max]).labels(y_labels));

    frame.render_widget(chart, area);
}

/// Evenly spaced (index, value) pairs for a line chart
fn line_points(series: &[ChartPoint]) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value as f64))
        .collect()
}

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
}

fn render_school_list(frame: &mut Frame, app: &App, snapshot: &DashboardSnapshot, area: Rect) {
    let header_cells = [
        Cell::from("Nome da Escola"),
        Cell::from("Tem Internet"),
        Cell::from("Tem Laboratório"),
    ];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = snapshot
        .schools
        .iter()
        .map(|school| {
            Row::new(vec![
                Cell::from(school.name.as_str()),
                Cell::from(yes_no(school.has_internet)).style(styles::yes_no_style(school.has_internet)),
                Cell::from(yes_no(school.has_lab)).style(styles::yes_no_style(school.has_lab)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(16),
        Constraint::Length(18),
    ];

    let title = format!(" Lista de Escolas ({}) ", snapshot.schools.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !snapshot.schools.is_empty() {
        state.select(Some(app.school_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
