//! # wikiquiz
//!
//! Client for an AI quiz generator: submit an article URL, play the
//! generated multiple-choice quiz, and revisit earlier quizzes from the
//! service's history.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use wikiquiz::{HttpQuizService, QuizError, SessionController};
//!
//! # async fn demo() -> Result<(), QuizError> {
//! let service = HttpQuizService::new("http://127.0.0.1:8000", Duration::from_secs(120))?;
//!
//! let mut session = SessionController::new();
//! session
//!     .generate(&service, "https://en.wikipedia.org/wiki/Deep_learning")
//!     .await?;
//!
//! let first = session.record().unwrap().questions[0].options[0].clone();
//! session.answer(0, &first);
//! println!("{} correct", session.score().correct);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod history;
mod models;
mod notify;
mod service;
mod session;
pub mod terminal;

pub use history::{HistoryResolver, NavigationPayload};
pub use models::{AnswerState, HistoryEntry, OptionOutcome, Question, QuizId, QuizRecord, Selection};
pub use notify::{Notice, NoticeLevel, Notifier, NotifyPolicy, Toasts};
pub use service::{HttpQuizService, QuizService};
pub use session::{
    ApplyOutcome, CancelToken, Completion, LoadStart, PendingRequest, QuizSource, Score,
    SessionController, SessionStatus,
};

/// Error type for quiz operations.
///
/// Cloneable so a failed session can keep the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    /// Input rejected before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The service could not generate a quiz.
    #[error("quiz generation failed: {message}")]
    GenerationFailed {
        /// HTTP status, if the service answered at all.
        status: Option<u16>,
        message: String,
    },

    /// The history listing could not be loaded.
    #[error("quiz history unavailable: {0}")]
    HistoryUnavailable(String),

    /// No quiz exists for the identifier.
    #[error("quiz {id} not found")]
    NotFound { id: QuizId },

    /// Network or HTTP failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request is already in flight for this session.
    #[error("a quiz request is already in progress")]
    AlreadyInProgress,

    /// A received quiz breaks the question invariants.
    #[error("malformed quiz, question {question}: {reason}")]
    MalformedQuiz { question: usize, reason: String },
}
