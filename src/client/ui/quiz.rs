//! Quiz screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{ClientApp, Screen};
use crate::models::{AnswerState, OptionOutcome, Question, QuizRecord};
use crate::session::Score;

/// Render the quiz screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let Screen::Quiz {
        current_question,
        selected_option,
    } = app.screen
    else {
        return;
    };

    let Some(record) = app.session.record() else {
        let waiting = Paragraph::new("No quiz loaded")
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(waiting, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(2), // Title and score
        Constraint::Length(8), // Article overview
        Constraint::Min(10),   // Question
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], record, app.session.score());
    render_overview(frame, chunks[1], record);

    if let (Some(question), Some(state)) = (
        record.questions.get(current_question),
        app.session.answer_state(current_question),
    ) {
        render_question(
            frame,
            chunks[2],
            question,
            state,
            current_question,
            record.questions.len(),
            selected_option,
        );
    }

    render_controls(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect, record: &QuizRecord, score: Score) {
    let title = if record.title.is_empty() {
        "Generated Quiz"
    } else {
        record.title.as_str()
    };

    let score_text = match score.percentage() {
        Some(percentage) => format!(
            "Score {}/{} ({:.0}%)  ·  {}/{} answered",
            score.correct, score.answered, percentage, score.answered, score.total
        ),
        None => format!("0/{} answered", score.total),
    };

    let content = vec![
        Line::from(vec![
            Span::styled(title, Style::default().fg(Color::Cyan).bold()),
            Span::styled(format!("  #{}", record.id), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled(record.source_url.as_str(), Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::styled(score_text, Style::default().fg(Color::Yellow)),
        ]),
    ];

    frame.render_widget(Paragraph::new(content), area);
}

fn render_overview(frame: &mut Frame, area: Rect, record: &QuizRecord) {
    let summary = if record.summary.is_empty() {
        "Explore the quiz below!"
    } else {
        record.summary.as_str()
    };

    let mut lines = vec![Line::from(Span::styled(
        summary,
        Style::default().fg(Color::White),
    ))];

    if !record.key_entities.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Key entities: ", Style::default().fg(Color::Cyan)),
            Span::styled(record.key_entities.join(", "), Style::default().fg(Color::Gray)),
        ]));
    }
    if !record.related_topics.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Related topics: ", Style::default().fg(Color::Cyan)),
            Span::styled(record.related_topics.join(", "), Style::default().fg(Color::Gray)),
        ]));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Summary ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_question(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    state: &AnswerState,
    index: usize,
    total: usize,
    cursor: usize,
) {
    let mut lines = vec![
        Line::from(Span::styled(
            question.prompt.as_str(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(""),
    ];

    for (i, option) in question.options.iter().enumerate() {
        let (marker, style) = match state.option_outcome(question, option) {
            Some(OptionOutcome::ChosenCorrect) => ("✔", Style::default().fg(Color::Green).bold()),
            Some(OptionOutcome::ChosenIncorrect) => ("✘", Style::default().fg(Color::Red).bold()),
            Some(OptionOutcome::UnchosenCorrect) => ("✔", Style::default().fg(Color::Green)),
            Some(OptionOutcome::Neutral) => (" ", Style::default().fg(Color::DarkGray)),
            None if i == cursor => (">", Style::default().fg(Color::Yellow).bold()),
            None => (" ", Style::default().fg(Color::White)),
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(format!("{}. ", option_label(i)), style),
            Span::styled(option.as_str(), style),
        ]));
    }

    if state.is_answered() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Correct answer: ", Style::default().fg(Color::Green)),
            Span::styled(question.correct_answer.as_str(), Style::default().fg(Color::White)),
        ]));
        if !question.explanation.is_empty() {
            lines.push(Line::from(Span::styled(
                question.explanation.as_str(),
                Style::default().fg(Color::Gray),
            )));
        }
        if !question.difficulty.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Difficulty: {}", question.difficulty),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Question {} of {} ", index + 1, total))
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(u8::is_ascii_uppercase)
        .map_or('?', char::from)
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "j/k option  ·  enter/1-9 answer  ·  n/p question  ·  h history  ·  esc home  ·  q quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
