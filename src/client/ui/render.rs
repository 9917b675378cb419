//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use crate::client::state::{ClientApp, Screen};
use crate::notify::{Notice, NoticeLevel};

use super::{history, home, quiz};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the client UI based on the current screen.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    let [body, toast] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

    match &app.screen {
        Screen::Home => home::render(frame, body, app),
        Screen::Loading { message, .. } => render_loading(frame, body, message, app.tick),
        Screen::Quiz { .. } => quiz::render(frame, body, app),
        Screen::History => history::render(frame, body, app),
    }

    if let Some(notice) = app.toasts.current() {
        render_toast(frame, toast, notice);
    }
}

fn render_loading(frame: &mut Frame, area: Rect, message: &str, tick: usize) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(7),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{}  {}...", SPINNER[tick % SPINNER.len()], message),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This may take 10-30 seconds",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Esc] to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

fn render_toast(frame: &mut Frame, area: Rect, notice: &Notice) {
    let color = match notice.level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Error => Color::Red,
    };

    let widget = Paragraph::new(notice.message.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).bold());
    frame.render_widget(widget, area);
}
