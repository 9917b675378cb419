//! Interactive client event loop.
//!
//! All state lives on this task. Requests run as spawned tasks and post
//! their results back over a channel, where they are applied to the
//! session in arrival order.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::QuizError;
use crate::history::HistoryResolver;
use crate::models::HistoryEntry;
use crate::notify::{Notice, Notifier, NotifyPolicy};
use crate::service::QuizService;
use crate::session::{ApplyOutcome, Completion, LoadStart, PendingRequest};
use crate::terminal::TerminalGuard;

use super::state::{ClientApp, Origin, Screen};
use super::ui;

const TICK_RATE: Duration = Duration::from_millis(120);

/// Results posted back by background requests.
#[derive(Debug)]
enum AppEvent {
    Session(Completion),
    History(Result<Vec<HistoryEntry>, QuizError>),
}

/// Everything key handlers need to start requests.
struct Requests<S> {
    service: Arc<S>,
    resolver: HistoryResolver<S>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl<S: QuizService + 'static> Requests<S> {
    fn run_session(&self, pending: PendingRequest) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        debug!(request_id = %pending.request_id(), "spawning session request");

        tokio::spawn(async move {
            let completion = pending.execute(service.as_ref()).await;
            let _ = tx.send(AppEvent::Session(completion));
        });
    }

    fn refresh_history(&self, app: &mut ClientApp) {
        if app.history_loading {
            return;
        }
        app.history_loading = true;

        let resolver = self.resolver.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = resolver.list_all().await;
            let _ = tx.send(AppEvent::History(result));
        });
    }
}

/// Run the interactive quiz client until the user quits.
pub async fn run<S: QuizService + 'static>(
    service: Arc<S>,
    api_url: String,
    policy: NotifyPolicy,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let requests = Requests {
        resolver: HistoryResolver::new(Arc::clone(&service)),
        service,
        tx,
    };
    let mut app = ClientApp::new(api_url, policy);

    let mut guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_RATE);
    info!("interactive client started");

    while !app.should_quit {
        guard.terminal().draw(|frame| ui::render(frame, &app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_input(&mut app, &requests, key.code);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(event) = rx.recv() => handle_app_event(&mut app, event),
            _ = ticker.tick() => {
                app.tick = app.tick.wrapping_add(1);
                app.toasts.prune();
            }
        }
    }

    app.session.teardown();
    info!("interactive client stopped");
    Ok(())
}

fn handle_app_event(app: &mut ClientApp, event: AppEvent) {
    match event {
        AppEvent::Session(completion) => match app.session.apply(completion) {
            ApplyOutcome::Ready => {
                let title = app
                    .session
                    .record()
                    .map(|r| r.title.clone())
                    .unwrap_or_default();
                app.toasts.notify(Notice::success(format!("Quiz ready: {title}")));
                app.enter_quiz();
            }
            ApplyOutcome::Failed(err) => {
                app.toasts.notify(Notice::error(err.to_string()));
                app.fall_back();
            }
            ApplyOutcome::Discarded => {}
        },
        AppEvent::History(Ok(entries)) => {
            app.toasts
                .notify(Notice::info(format!("{} quizzes in history", entries.len())));
            app.set_history(entries);
        }
        AppEvent::History(Err(err)) => {
            app.history_loading = false;
            app.toasts.notify(Notice::error(err.to_string()));
        }
    }
}

fn handle_input<S: QuizService + 'static>(app: &mut ClientApp, requests: &Requests<S>, key: KeyCode) {
    match &app.screen {
        Screen::Home => match key {
            KeyCode::Esc => app.should_quit = true,
            KeyCode::Tab => {
                app.screen = Screen::History;
                requests.refresh_history(app);
            }
            KeyCode::Enter => match app.session.start_generation(&app.url_input) {
                Ok(pending) => {
                    app.toasts.notify(Notice::info("Generating quiz"));
                    app.enter_loading(
                        "Scraping the article and generating a quiz",
                        Origin::Home,
                    );
                    requests.run_session(pending);
                }
                Err(err) => app.toasts.notify(Notice::error(err.to_string())),
            },
            KeyCode::Backspace => app.url_input_pop(),
            KeyCode::Char(c) => app.url_input_push(c),
            _ => {}
        },
        Screen::Loading { .. } => {
            if key == KeyCode::Esc {
                app.session.teardown();
                app.toasts.notify(Notice::info("Request abandoned"));
                app.fall_back();
            }
        }
        Screen::Quiz { .. } => match key {
            KeyCode::Up | KeyCode::Char('k') => app.step_option(false),
            KeyCode::Down | KeyCode::Char('j') => app.step_option(true),
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('n') => app.step_question(true),
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('p') => app.step_question(false),
            KeyCode::Enter | KeyCode::Char(' ') => app.answer_current(None),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                app.answer_current(Some(index));
            }
            KeyCode::Char('h') => {
                app.go_home();
                app.screen = Screen::History;
                requests.refresh_history(app);
            }
            KeyCode::Esc => app.go_home(),
            KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
            _ => {}
        },
        Screen::History => match key {
            KeyCode::Up | KeyCode::Char('k') => app.history_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.history_next(),
            KeyCode::Char('r') => requests.refresh_history(app),
            KeyCode::Enter => open_history_entry(app, requests),
            KeyCode::Esc => app.screen = Screen::Home,
            KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
            _ => {}
        },
    }
}

fn open_history_entry<S: QuizService + 'static>(app: &mut ClientApp, requests: &Requests<S>) {
    let Some(entry) = app.selected_history_entry().cloned() else {
        return;
    };

    let started = requests
        .resolver
        .source_for_entry(&entry)
        .and_then(|source| app.session.load_existing(source));

    match started {
        Ok(LoadStart::Ready) => app.enter_quiz(),
        Ok(LoadStart::Pending(pending)) => {
            app.enter_loading(format!("Loading \"{}\"", entry.title), Origin::History);
            requests.run_session(pending);
        }
        Err(err) => app.toasts.notify(Notice::error(err.to_string())),
    }
}
