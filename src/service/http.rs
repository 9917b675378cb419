//! `reqwest` client for the quiz service.

use std::time::Duration;

use reqwest::{Response, StatusCode, Url};
use tracing::{debug, warn};

use super::QuizService;
use super::wire::{ErrorBody, GenerateRequest, RecordBody};
use crate::QuizError;
use crate::models::{HistoryEntry, QuizId, QuizRecord};

/// HTTP client for the quiz service.
#[derive(Debug, Clone)]
pub struct HttpQuizService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpQuizService {
    /// Create a client for the service at `base_url`.
    ///
    /// `timeout` bounds each whole request; generation routinely takes
    /// 10-30 seconds.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, QuizError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wikiquiz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QuizError::Transport(format!("building HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, http))
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `/quiz/{id}` with the id escaped as a single path segment.
    fn quiz_endpoint(&self, id: &QuizId) -> Result<Url, QuizError> {
        let mut url = Url::parse(&self.endpoint("/quiz"))
            .map_err(|e| QuizError::Transport(format!("invalid service URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| QuizError::Transport(format!("invalid service URL: {}", self.base_url)))?
            .push(id.as_str());
        Ok(url)
    }
}

impl QuizService for HttpQuizService {
    async fn generate(&self, url: &str) -> Result<QuizRecord, QuizError> {
        let endpoint = self.endpoint("/generate_quiz");
        debug!(%endpoint, url, "requesting quiz generation");

        let failed = |status: Option<StatusCode>, message: String| QuizError::GenerationFailed {
            status: status.map(|s| s.as_u16()),
            message,
        };

        let resp = self
            .http
            .post(&endpoint)
            .json(&GenerateRequest { url })
            .send()
            .await
            .map_err(|e| failed(None, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = error_message(resp).await;
            warn!(status = status.as_u16(), %message, "quiz generation rejected");
            return Err(failed(Some(status), message));
        }

        let body: RecordBody = resp
            .json()
            .await
            .map_err(|e| failed(Some(status), format!("invalid quiz body: {e}")))?;

        body.into_record(None, Some(url))
            .ok_or_else(|| failed(Some(status), "response carried no quiz id".to_string()))
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, QuizError> {
        let endpoint = self.endpoint("/history");
        debug!(%endpoint, "requesting quiz history");

        let resp = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| QuizError::HistoryUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = error_message(resp).await;
            warn!(status = status.as_u16(), %message, "history request rejected");
            return Err(QuizError::HistoryUnavailable(format!("HTTP {status}: {message}")));
        }

        resp.json()
            .await
            .map_err(|e| QuizError::HistoryUnavailable(format!("invalid history body: {e}")))
    }

    async fn fetch_by_id(&self, id: &QuizId) -> Result<QuizRecord, QuizError> {
        if id.is_blank() {
            return Err(QuizError::Validation("quiz id is empty".to_string()));
        }
        let endpoint = self.quiz_endpoint(id)?;
        debug!(%endpoint, "requesting quiz");

        let resp = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| QuizError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(QuizError::NotFound { id: id.clone() });
        }
        if !status.is_success() {
            let message = error_message(resp).await;
            warn!(status = status.as_u16(), %message, %id, "quiz request rejected");
            return Err(QuizError::Transport(format!("HTTP {status}: {message}")));
        }

        let body: RecordBody = resp
            .json()
            .await
            .map_err(|e| QuizError::Transport(format!("invalid quiz body: {e}")))?;

        body.into_record(Some(id), None)
            .ok_or_else(|| QuizError::NotFound { id: id.clone() })
    }
}

/// Best-effort message from a failed response.
async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message(),
        Err(_) if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => text,
    }
}
