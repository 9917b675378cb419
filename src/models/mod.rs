mod answer;
mod quiz;

pub use answer::{AnswerState, OptionOutcome, Selection};
pub use quiz::{HistoryEntry, Question, QuizId, QuizRecord};

pub(crate) use quiz::deserialize_timestamp;
