//! Client-local play state layered over a quiz record.

mod cancel;
mod controller;

pub use cancel::CancelToken;
pub use controller::{
    ApplyOutcome, Completion, LoadStart, PendingRequest, QuizSource, Score, SessionController,
    SessionStatus,
};
