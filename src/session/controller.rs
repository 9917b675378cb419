//! Quiz session state machine.
//!
//! A controller moves `Idle -> Pending -> Ready | Failed`. Requests are split
//! in three steps so the consumer stays responsive while one is in flight:
//! a synchronous start that returns a [`PendingRequest`], an asynchronous
//! [`PendingRequest::execute`] against any [`QuizService`], and a
//! synchronous [`SessionController::apply`] of the resulting [`Completion`].

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::CancelToken;
use crate::QuizError;
use crate::models::{AnswerState, HistoryEntry, QuizId, QuizRecord, Selection};
use crate::service::QuizService;

/// Observable status of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Pending,
    Ready,
    Failed(QuizError),
}

/// Where a quiz to play comes from.
#[derive(Debug, Clone)]
pub enum QuizSource {
    /// Already in hand, e.g. just generated.
    Record(QuizRecord),
    /// Must be fetched from the service.
    Id(QuizId),
    /// A history row; fetched by its id, with the row's title, URL and date
    /// filling in what the stored body lacks.
    Entry(HistoryEntry),
}

#[derive(Debug, Clone)]
enum Request {
    Generate(String),
    Fetch {
        id: QuizId,
        listing: Option<HistoryEntry>,
    },
}

/// A request admitted by the controller but not yet sent.
#[derive(Debug)]
#[must_use = "a pending request does nothing until executed"]
pub struct PendingRequest {
    request_id: Uuid,
    token: CancelToken,
    request: Request,
}

impl PendingRequest {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Cancelling this token makes the controller discard the result.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub async fn execute<S: QuizService>(self, service: &S) -> Completion {
        let Self {
            request_id,
            token,
            request,
        } = self;

        let result = match &request {
            Request::Generate(url) => service.generate(url).await,
            Request::Fetch { id, listing } => {
                let fetched = service.fetch_by_id(id).await;
                match listing {
                    Some(entry) => fetched.map(|record| record.with_listing_details(entry)),
                    None => fetched,
                }
            }
        };

        Completion {
            request_id,
            token,
            result,
        }
    }
}

/// Result of an executed request, waiting to be applied.
#[derive(Debug)]
pub struct Completion {
    request_id: Uuid,
    token: CancelToken,
    result: Result<QuizRecord, QuizError>,
}

impl Completion {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn result(&self) -> Result<&QuizRecord, &QuizError> {
        self.result.as_ref()
    }
}

/// How [`SessionController::load_existing`] proceeded.
#[derive(Debug)]
pub enum LoadStart {
    /// The record was in hand; the session is ready.
    Ready,
    /// The record has to be fetched first.
    Pending(PendingRequest),
}

/// What applying a [`Completion`] did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Ready,
    Failed(QuizError),
    /// Stale or cancelled; the session was left untouched.
    Discarded,
}

/// Correct answers out of answered questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub answered: usize,
    pub total: usize,
}

impl Score {
    /// Share of answered questions that were right, `None` before any answer.
    pub fn percentage(&self) -> Option<f64> {
        (self.answered > 0).then(|| self.correct as f64 * 100.0 / self.answered as f64)
    }
}

struct Session {
    record: QuizRecord,
    answers: Vec<AnswerState>,
}

impl Session {
    fn new(record: QuizRecord) -> Self {
        let answers = vec![AnswerState::Unanswered; record.questions.len()];
        Self { record, answers }
    }

    fn score(&self) -> Score {
        let answered = self.answers.iter().filter(|a| a.is_answered()).count();
        let correct = self
            .answers
            .iter()
            .zip(&self.record.questions)
            .filter(|(answer, question)| answer.is_correct(question) == Some(true))
            .count();

        Score {
            correct,
            answered,
            total: self.record.questions.len(),
        }
    }
}

enum Phase {
    Idle,
    Pending { request_id: Uuid, token: CancelToken },
    Ready(Session),
    Failed(QuizError),
}

/// Owns one quiz and its answer progress.
pub struct SessionController {
    phase: Phase,
}

impl SessionController {
    /// An idle controller with no quiz.
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Current status; `Failed` carries the error that ended the last request.
    pub fn status(&self) -> SessionStatus {
        match &self.phase {
            Phase::Idle => SessionStatus::Idle,
            Phase::Pending { .. } => SessionStatus::Pending,
            Phase::Ready(_) => SessionStatus::Ready,
            Phase::Failed(err) => SessionStatus::Failed(err.clone()),
        }
    }

    /// Whether a request is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    /// Admit a generation request for `url`.
    ///
    /// Blank input is rejected without touching the session. Only one
    /// request may be in flight at a time.
    pub fn start_generation(&mut self, url: &str) -> Result<PendingRequest, QuizError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(QuizError::Validation("article URL is empty".to_string()));
        }
        self.ensure_not_pending()?;

        Ok(self.begin(Request::Generate(url.to_string())))
    }

    /// Put an existing quiz into play, fetching it first if only the id is
    /// known.
    ///
    /// A blank id is rejected before any request is admitted.
    pub fn load_existing(&mut self, source: QuizSource) -> Result<LoadStart, QuizError> {
        let request = match source {
            QuizSource::Record(record) => {
                self.ensure_not_pending()?;
                self.enter_play(record)?;
                return Ok(LoadStart::Ready);
            }
            QuizSource::Id(id) => {
                require_id(&id)?;
                Request::Fetch { id, listing: None }
            }
            QuizSource::Entry(entry) => {
                require_id(&entry.id)?;
                Request::Fetch {
                    id: entry.id.clone(),
                    listing: Some(entry),
                }
            }
        };
        self.ensure_not_pending()?;

        Ok(LoadStart::Pending(self.begin(request)))
    }

    /// Apply the outcome of the in-flight request.
    ///
    /// Completions from an earlier cycle, or whose token was cancelled, have
    /// no effect.
    pub fn apply(&mut self, completion: Completion) -> ApplyOutcome {
        let Completion {
            request_id,
            token,
            result,
        } = completion;

        let active = match &self.phase {
            Phase::Pending {
                request_id: active, ..
            } => *active,
            _ => {
                debug!(%request_id, "discarding completion, no request in flight");
                return ApplyOutcome::Discarded;
            }
        };
        if active != request_id {
            debug!(%request_id, %active, "discarding stale completion");
            return ApplyOutcome::Discarded;
        }
        if token.is_cancelled() {
            debug!(%request_id, "discarding cancelled completion");
            self.phase = Phase::Idle;
            return ApplyOutcome::Discarded;
        }

        match result.and_then(|record| self.enter_play(record)) {
            Ok(()) => ApplyOutcome::Ready,
            Err(err) => {
                warn!(%request_id, error = %err, "quiz request failed");
                self.phase = Phase::Failed(err.clone());
                ApplyOutcome::Failed(err)
            }
        }
    }

    /// Drop the session. A request still in flight is cancelled and its
    /// result will be discarded.
    pub fn teardown(&mut self) {
        if let Phase::Pending { request_id, token } = &self.phase {
            debug!(%request_id, "tearing down session with a request in flight");
            token.cancel();
        }
        self.phase = Phase::Idle;
    }

    /// Record an answer. Does nothing unless the session is ready and the
    /// index is in range.
    pub fn answer(&mut self, question_index: usize, option: &str) -> Option<Selection> {
        let Phase::Ready(session) = &mut self.phase else {
            return None;
        };
        let question = session.record.questions.get(question_index)?;
        let state = session.answers.get_mut(question_index)?;

        Some(state.select(question, option))
    }

    /// Score so far; all zeros unless a quiz is ready.
    pub fn score(&self) -> Score {
        match &self.phase {
            Phase::Ready(session) => session.score(),
            _ => Score::default(),
        }
    }

    /// The quiz in play.
    pub fn record(&self) -> Option<&QuizRecord> {
        match &self.phase {
            Phase::Ready(session) => Some(&session.record),
            _ => None,
        }
    }

    /// Answer states in question order; empty unless ready.
    pub fn answers(&self) -> &[AnswerState] {
        match &self.phase {
            Phase::Ready(session) => &session.answers,
            _ => &[],
        }
    }

    /// Answer state of one question, `None` when out of range or not ready.
    pub fn answer_state(&self, question_index: usize) -> Option<&AnswerState> {
        self.answers().get(question_index)
    }

    /// Whether every question of a ready session has been answered.
    pub fn is_complete(&self) -> bool {
        match &self.phase {
            Phase::Ready(session) => session.answers.iter().all(AnswerState::is_answered),
            _ => false,
        }
    }

    /// Generate a quiz and wait for it.
    pub async fn generate<S: QuizService>(&mut self, service: &S, url: &str) -> Result<(), QuizError> {
        let pending = self.start_generation(url)?;
        let completion = pending.execute(service).await;
        self.settle(completion)
    }

    /// Load a quiz and wait for it.
    pub async fn load<S: QuizService>(
        &mut self,
        service: &S,
        source: QuizSource,
    ) -> Result<(), QuizError> {
        match self.load_existing(source)? {
            LoadStart::Ready => Ok(()),
            LoadStart::Pending(pending) => {
                let completion = pending.execute(service).await;
                self.settle(completion)
            }
        }
    }

    fn settle(&mut self, completion: Completion) -> Result<(), QuizError> {
        match self.apply(completion) {
            ApplyOutcome::Ready => Ok(()),
            ApplyOutcome::Failed(err) => Err(err),
            ApplyOutcome::Discarded => Err(QuizError::Transport(
                "request cancelled before completion".to_string(),
            )),
        }
    }

    fn ensure_not_pending(&self) -> Result<(), QuizError> {
        if self.is_pending() {
            return Err(QuizError::AlreadyInProgress);
        }
        Ok(())
    }

    fn begin(&mut self, request: Request) -> PendingRequest {
        let request_id = Uuid::new_v4();
        let token = CancelToken::new();
        debug!(%request_id, ?request, "session request started");

        self.phase = Phase::Pending {
            request_id,
            token: token.clone(),
        };

        PendingRequest {
            request_id,
            token,
            request,
        }
    }

    fn enter_play(&mut self, record: QuizRecord) -> Result<(), QuizError> {
        if let Err(err) = record.validate() {
            self.phase = Phase::Failed(err.clone());
            return Err(err);
        }

        info!(id = %record.id, questions = record.questions.len(), "quiz ready");
        self.phase = Phase::Ready(Session::new(record));
        Ok(())
    }
}

fn require_id(id: &QuizId) -> Result<(), QuizError> {
    if id.is_blank() {
        return Err(QuizError::Validation("quiz id is empty".to_string()));
    }
    Ok(())
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::service::fake::{FakeService, sample_record};

    const ARTICLE: &str = "https://en.wikipedia.org/wiki/Deep_learning";

    #[test]
    fn test_new_session_is_idle_with_empty_score() {
        let session = SessionController::new();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.score(), Score::default());
        assert!(session.record().is_none());
        assert!(session.answers().is_empty());
    }

    #[tokio::test]
    async fn test_blank_url_is_rejected_without_a_request() {
        let service = FakeService::generating(Ok(sample_record("abc123", 5)));
        let mut session = SessionController::new();

        for input in ["", "   ", "\t\n"] {
            let err = session.generate(&service, input).await.unwrap_err();
            assert!(matches!(err, QuizError::Validation(_)));
        }

        assert_eq!(service.calls(), (0, 0, 0));
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_generated_quiz_can_be_played() {
        let service = FakeService::generating(Ok(sample_record("abc123", 5)));
        let mut session = SessionController::new();

        session.generate(&service, ARTICLE).await.unwrap();
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.score(), Score { correct: 0, answered: 0, total: 5 });
        assert_eq!(session.answers().len(), 5);

        let record = session.record().unwrap();
        assert_eq!(record.id.as_str(), "abc123");
        let option = record.questions[0].options[2].clone();
        assert_eq!(option, record.questions[0].correct_answer);

        assert_eq!(session.answer(0, &option), Some(Selection::Recorded));
        assert_eq!(session.score(), Score { correct: 1, answered: 1, total: 5 });
    }

    #[tokio::test]
    async fn test_second_request_while_pending_is_rejected() {
        let service = Arc::new(FakeService::gated(Ok(sample_record("abc123", 5))));
        let mut session = SessionController::new();

        let pending = session.start_generation(ARTICLE).unwrap();
        let in_flight = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { pending.execute(service.as_ref()).await })
        };

        assert_eq!(
            session.start_generation("https://en.wikipedia.org/wiki/Alan_Turing").unwrap_err(),
            QuizError::AlreadyInProgress
        );
        assert!(matches!(
            session.load_existing(QuizSource::Id(QuizId::new("1"))),
            Err(QuizError::AlreadyInProgress)
        ));
        assert_eq!(session.status(), SessionStatus::Pending);

        service.release();
        let completion = in_flight.await.unwrap();
        assert_eq!(session.apply(completion), ApplyOutcome::Ready);
        assert_eq!(session.record().unwrap().id.as_str(), "abc123");
        assert_eq!(service.calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_unknown_id_fails_without_answer_state() {
        let service = FakeService::default();
        let mut session = SessionController::new();

        let err = session
            .load(&service, QuizSource::Id(QuizId::new("xyz")))
            .await
            .unwrap_err();

        let not_found = QuizError::NotFound { id: QuizId::new("xyz") };
        assert_eq!(err, not_found);
        assert_eq!(session.status(), SessionStatus::Failed(not_found));
        assert!(session.answers().is_empty());
        assert_eq!(session.answer(0, "alpha"), None);
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected_without_a_request() {
        let service = FakeService::default();
        let mut session = SessionController::new();

        let err = session
            .load(&service, QuizSource::Id(QuizId::new(" ")))
            .await
            .unwrap_err();

        assert!(matches!(err, QuizError::Validation(_)));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(service.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_history_row_fills_in_stored_body_gaps() {
        let mut stored = sample_record("3", 2);
        stored.title = String::new();
        stored.source_url = String::new();
        let service = FakeService::storing(vec![stored]);
        let entry = HistoryEntry {
            id: QuizId::new("3"),
            title: "Alan Turing".to_string(),
            source_url: "https://en.wikipedia.org/wiki/Alan_Turing".to_string(),
            date_generated: None,
        };

        let mut session = SessionController::new();
        session
            .load(&service, QuizSource::Entry(entry))
            .await
            .unwrap();

        let record = session.record().unwrap();
        assert_eq!(record.id.as_str(), "3");
        assert_eq!(record.title, "Alan Turing");
        assert_eq!(record.source_url, "https://en.wikipedia.org/wiki/Alan_Turing");
        assert_eq!(service.calls(), (0, 0, 1));
    }

    #[tokio::test]
    async fn test_record_source_is_ready_without_fetching() {
        let service = FakeService::default();
        let mut session = SessionController::new();

        let start = session
            .load_existing(QuizSource::Record(sample_record("7", 3)))
            .unwrap();
        assert!(matches!(start, LoadStart::Ready));
        assert_eq!(session.status(), SessionStatus::Ready);

        session
            .load(&service, QuizSource::Record(sample_record("8", 2)))
            .await
            .unwrap();
        assert_eq!(session.record().unwrap().id.as_str(), "8");
        assert_eq!(service.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_result_after_teardown_has_no_effect() {
        let service = FakeService::generating(Ok(sample_record("abc123", 5)));
        let mut session = SessionController::new();

        let pending = session.start_generation(ARTICLE).unwrap();
        session.teardown();
        let completion = pending.execute(&service).await;

        assert_eq!(session.apply(completion), ApplyOutcome::Discarded);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.record().is_none());
    }

    #[tokio::test]
    async fn test_stale_completion_does_not_replace_newer_request() {
        let mut session = SessionController::new();
        let first_service = FakeService::generating(Ok(sample_record("first", 2)));
        let second_service = FakeService::generating(Ok(sample_record("second", 3)));

        let first = session.start_generation(ARTICLE).unwrap();
        session.teardown();
        let second = session.start_generation(ARTICLE).unwrap();

        let first = first.execute(&first_service).await;
        let second = second.execute(&second_service).await;

        assert_eq!(session.apply(first), ApplyOutcome::Discarded);
        assert_eq!(session.status(), SessionStatus::Pending);
        assert_eq!(session.apply(second), ApplyOutcome::Ready);
        assert_eq!(session.record().unwrap().id.as_str(), "second");
    }

    #[tokio::test]
    async fn test_cancelled_token_discards_result() {
        let service = FakeService::generating(Ok(sample_record("abc123", 5)));
        let mut session = SessionController::new();

        let pending = session.start_generation(ARTICLE).unwrap();
        pending.token().cancel();
        let completion = pending.execute(&service).await;

        assert_eq!(session.apply(completion), ApplyOutcome::Discarded);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_failed_generation_discards_previous_quiz() {
        let mut session = SessionController::new();
        session
            .load_existing(QuizSource::Record(sample_record("old", 2)))
            .unwrap();
        session.answer(0, "gamma");

        let failure = QuizError::GenerationFailed {
            status: Some(400),
            message: "not an article".to_string(),
        };
        let service = FakeService::generating(Err(failure.clone()));
        let err = session.generate(&service, ARTICLE).await.unwrap_err();

        assert_eq!(err, failure);
        assert_eq!(session.status(), SessionStatus::Failed(failure));
        assert!(session.record().is_none());
        assert_eq!(session.score(), Score::default());
    }

    #[tokio::test]
    async fn test_malformed_quiz_fails_the_session() {
        let mut record = sample_record("bad", 2);
        record.questions[1].correct_answer = "omega".to_string();
        let service = FakeService::generating(Ok(record));
        let mut session = SessionController::new();

        let err = session.generate(&service, ARTICLE).await.unwrap_err();
        assert!(matches!(err, QuizError::MalformedQuiz { question: 1, .. }));
        assert!(matches!(session.status(), SessionStatus::Failed(_)));
    }

    #[test]
    fn test_answers_are_final_and_scored_over_answered() {
        let mut session = SessionController::new();
        session
            .load_existing(QuizSource::Record(sample_record("7", 5)))
            .unwrap();

        assert_eq!(session.answer(0, "gamma"), Some(Selection::Recorded));
        assert_eq!(session.answer(0, "alpha"), Some(Selection::AlreadyAnswered));
        assert_eq!(session.answer(1, "beta"), Some(Selection::Recorded));
        assert_eq!(session.answer(2, "omega"), Some(Selection::UnknownOption));
        assert_eq!(session.answer(9, "gamma"), None);

        let score = session.score();
        assert_eq!(score, Score { correct: 1, answered: 2, total: 5 });
        assert_eq!(score.percentage(), Some(50.0));
        assert_eq!(session.answer_state(0).unwrap().selected_option(), Some("gamma"));
        assert!(!session.is_complete());

        for index in 2..5 {
            session.answer(index, "delta");
        }
        assert!(session.is_complete());
    }
}
