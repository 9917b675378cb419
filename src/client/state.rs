//! Client state management.

use crate::models::HistoryEntry;
use crate::notify::{NotifyPolicy, Toasts};
use crate::session::SessionController;

/// Screen the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Entering an article URL.
    Home,

    /// Waiting for a quiz to be generated or fetched.
    Loading { message: String, origin: Origin },

    /// Playing the quiz held by the session.
    Quiz {
        current_question: usize,
        selected_option: usize,
    },

    /// Browsing previously generated quizzes.
    History,
}

/// Screen to fall back to when a request fails or is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Home,
    History,
}

/// Client application state.
pub struct ClientApp {
    /// Current screen.
    pub screen: Screen,
    /// Play state of the active quiz.
    pub session: SessionController,
    /// Transient notices.
    pub toasts: Toasts,
    /// URL being typed on the home screen.
    pub url_input: String,
    /// Last history listing received.
    pub history: Vec<HistoryEntry>,
    /// Highlighted history row.
    pub history_selected: usize,
    /// Whether a history listing is being fetched.
    pub history_loading: bool,
    /// Quiz service base URL (for display).
    pub api_url: String,
    /// Animation frame counter.
    pub tick: usize,
    /// Whether the client should quit.
    pub should_quit: bool,
}

const URL_INPUT_LIMIT: usize = 512;

impl ClientApp {
    pub fn new(api_url: String, policy: NotifyPolicy) -> Self {
        Self {
            screen: Screen::Home,
            session: SessionController::new(),
            toasts: Toasts::new(policy),
            url_input: String::new(),
            history: Vec::new(),
            history_selected: 0,
            history_loading: false,
            api_url,
            tick: 0,
            should_quit: false,
        }
    }

    /// Leave the current quiz, dropping any request still in flight.
    pub fn go_home(&mut self) {
        self.session.teardown();
        self.screen = Screen::Home;
    }

    pub fn enter_loading(&mut self, message: impl Into<String>, origin: Origin) {
        self.screen = Screen::Loading {
            message: message.into(),
            origin,
        };
    }

    pub fn enter_quiz(&mut self) {
        self.screen = Screen::Quiz {
            current_question: 0,
            selected_option: 0,
        };
    }

    /// Return to where a failed or abandoned request was started.
    pub fn fall_back(&mut self) {
        if let Screen::Loading { origin, .. } = self.screen {
            self.screen = match origin {
                Origin::Home => Screen::Home,
                Origin::History => Screen::History,
            };
        }
    }

    pub fn url_input_push(&mut self, c: char) {
        if self.url_input.len() < URL_INPUT_LIMIT && !c.is_control() {
            self.url_input.push(c);
        }
    }

    pub fn url_input_pop(&mut self) {
        self.url_input.pop();
    }

    pub fn set_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history = entries;
        self.history_selected = self
            .history_selected
            .min(self.history.len().saturating_sub(1));
        self.history_loading = false;
    }

    pub fn selected_history_entry(&self) -> Option<&HistoryEntry> {
        self.history.get(self.history_selected)
    }

    pub fn history_next(&mut self) {
        if !self.history.is_empty() {
            self.history_selected = (self.history_selected + 1) % self.history.len();
        }
    }

    pub fn history_previous(&mut self) {
        if !self.history.is_empty() {
            let len = self.history.len();
            self.history_selected = (self.history_selected + len - 1) % len;
        }
    }

    fn question_count(&self) -> usize {
        self.session.record().map_or(0, |r| r.questions.len())
    }

    fn option_count(&self, question: usize) -> usize {
        self.session
            .record()
            .and_then(|r| r.questions.get(question))
            .map_or(0, |q| q.options.len())
    }

    /// Move to another question, wrapping around.
    pub fn step_question(&mut self, forward: bool) {
        let total = self.question_count();
        if let Screen::Quiz {
            current_question,
            selected_option,
        } = &mut self.screen
        {
            if total == 0 {
                return;
            }
            *current_question = if forward {
                (*current_question + 1) % total
            } else {
                (*current_question + total - 1) % total
            };
            *selected_option = 0;
        }
    }

    /// Move the option cursor within the current question.
    pub fn step_option(&mut self, forward: bool) {
        let Screen::Quiz {
            current_question, ..
        } = self.screen
        else {
            return;
        };
        let count = self.option_count(current_question);

        if let Screen::Quiz {
            selected_option, ..
        } = &mut self.screen
        {
            if count == 0 {
                return;
            }
            *selected_option = if forward {
                (*selected_option + 1) % count
            } else {
                (*selected_option + count - 1) % count
            };
        }
    }

    /// Answer the current question with the option under the cursor, or
    /// with `index` when given.
    pub fn answer_current(&mut self, index: Option<usize>) {
        let Screen::Quiz {
            current_question,
            selected_option,
        } = self.screen
        else {
            return;
        };

        let option = self
            .session
            .record()
            .and_then(|r| r.questions.get(current_question))
            .and_then(|q| q.options.get(index.unwrap_or(selected_option)))
            .cloned();

        if let Some(option) = option {
            self.session.answer(current_question, &option);
            if let Screen::Quiz {
                selected_option, ..
            } = &mut self.screen
            {
                *selected_option = index.unwrap_or(*selected_option);
            }
        }
    }
}
