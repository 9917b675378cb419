//! History screen: previously generated quizzes.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};

use crate::client::state::ClientApp;

/// Render the history screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Length(2), // Title
        Constraint::Min(5),    // Table
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    let title = Paragraph::new("QUIZ HISTORY")
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    if app.history.is_empty() {
        let message = if app.history_loading {
            "Loading history..."
        } else {
            "No quizzes yet"
        };
        let widget = Paragraph::new(message)
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(widget, chunks[1]);
    } else {
        render_table(frame, chunks[1], app);
    }

    let controls = Paragraph::new("j/k select  ·  enter view quiz  ·  r refresh  ·  esc back  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[2]);
}

fn render_table(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let header = Row::new(["ID", "Title", "URL", "Date Generated"])
        .style(Style::default().fg(Color::Cyan).bold());

    let rows = app.history.iter().map(|entry| {
        let date = entry
            .date_generated
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        Row::new([
            entry.id.to_string(),
            entry.title.clone(),
            entry.source_url.clone(),
            date,
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Percentage(30),
            Constraint::Fill(1),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().fg(Color::Yellow).bold())
    .highlight_symbol("> ")
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    let mut state = TableState::default().with_selected(Some(app.history_selected));
    frame.render_stateful_widget(table, area, &mut state);
}
