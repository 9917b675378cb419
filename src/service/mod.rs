//! Remote quiz service.
//!
//! Quiz generation and storage both live behind an HTTP service; this module
//! defines the contract the rest of the crate relies on and the `reqwest`
//! implementation of it.

mod http;
mod wire;

use crate::QuizError;
use crate::models::{HistoryEntry, QuizId, QuizRecord};

pub use http::HttpQuizService;

/// Operations offered by the remote quiz service.
///
/// None of the operations retry; retry policy belongs to the caller.
pub trait QuizService: Send + Sync {
    /// Generate a quiz for an article URL. The caller has already checked
    /// that `url` is non-empty.
    ///
    /// Fails with [`QuizError::GenerationFailed`].
    fn generate(&self, url: &str) -> impl Future<Output = Result<QuizRecord, QuizError>> + Send;

    /// Every stored quiz, in the order the service returns them.
    ///
    /// Fails with [`QuizError::HistoryUnavailable`].
    fn list_history(&self) -> impl Future<Output = Result<Vec<HistoryEntry>, QuizError>> + Send;

    /// Full record for a known identifier.
    ///
    /// Fails with [`QuizError::NotFound`] or [`QuizError::Transport`].
    fn fetch_by_id(
        &self,
        id: &QuizId,
    ) -> impl Future<Output = Result<QuizRecord, QuizError>> + Send;
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted in-memory service used by the session and history tests.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    use super::*;
    use crate::models::Question;

    pub fn sample_record(id: &str, questions: usize) -> QuizRecord {
        QuizRecord {
            id: QuizId::new(id),
            title: "Deep learning".to_string(),
            source_url: "https://en.wikipedia.org/wiki/Deep_learning".to_string(),
            date_generated: None,
            summary: "Deep learning is a subset of machine learning.".to_string(),
            key_entities: vec!["Geoffrey Hinton".to_string(), "Yann LeCun".to_string()],
            related_topics: vec!["Neural network".to_string()],
            sections: Vec::new(),
            questions: (0..questions)
                .map(|n| Question {
                    prompt: format!("Question {n}?"),
                    options: vec![
                        "alpha".to_string(),
                        "beta".to_string(),
                        "gamma".to_string(),
                        "delta".to_string(),
                    ],
                    correct_answer: "gamma".to_string(),
                    explanation: format!("Because of reason {n}."),
                    difficulty: "easy".to_string(),
                })
                .collect(),
        }
    }

    #[derive(Default)]
    pub struct FakeService {
        pub generated: Mutex<Option<Result<QuizRecord, QuizError>>>,
        pub stored: Mutex<HashMap<QuizId, QuizRecord>>,
        pub history: Mutex<Option<Result<Vec<HistoryEntry>, QuizError>>>,
        /// When set, `generate` waits for a notification before answering.
        pub gate: Option<Notify>,
        pub generate_calls: AtomicUsize,
        pub history_calls: AtomicUsize,
        pub fetch_calls: AtomicUsize,
    }

    impl FakeService {
        pub fn generating(result: Result<QuizRecord, QuizError>) -> Self {
            Self {
                generated: Mutex::new(Some(result)),
                ..Self::default()
            }
        }

        pub fn gated(result: Result<QuizRecord, QuizError>) -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::generating(result)
            }
        }

        pub fn storing(records: Vec<QuizRecord>) -> Self {
            let history = records.iter().map(QuizRecord::history_entry).collect();
            Self {
                stored: Mutex::new(records.into_iter().map(|r| (r.id.clone(), r)).collect()),
                history: Mutex::new(Some(Ok(history))),
                ..Self::default()
            }
        }

        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.notify_one();
            }
        }

        pub fn calls(&self) -> (usize, usize, usize) {
            (
                self.generate_calls.load(Ordering::SeqCst),
                self.history_calls.load(Ordering::SeqCst),
                self.fetch_calls.load(Ordering::SeqCst),
            )
        }
    }

    impl QuizService for FakeService {
        async fn generate(&self, url: &str) -> Result<QuizRecord, QuizError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.generated
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| {
                    Err(QuizError::GenerationFailed {
                        status: Some(400),
                        message: format!("cannot scrape {url}"),
                    })
                })
        }

        async fn list_history(&self) -> Result<Vec<HistoryEntry>, QuizError> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.history
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(QuizError::HistoryUnavailable("offline".to_string())))
        }

        async fn fetch_by_id(&self, id: &QuizId) -> Result<QuizRecord, QuizError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.stored
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| QuizError::NotFound { id: id.clone() })
        }
    }
}
