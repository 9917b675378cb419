//! Home screen: article URL entry.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::client::state::ClientApp;

const EXAMPLE_URL: &str = "https://en.wikipedia.org/wiki/Deep_learning";

/// Render the home screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(12),
        Constraint::Percentage(30),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "WIKIPEDIA QUIZ GENERATOR",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            "Turn any article into a multiple-choice quiz",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Service: {}", app.api_url),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            format!("Example: {EXAMPLE_URL}"),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Article URL: ", Style::default().fg(Color::White)),
            Span::styled(app.url_input.as_str(), Style::default().fg(Color::Yellow)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] generate  ·  [Tab] history  ·  [Esc] quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
