//! JSON bodies exchanged with the quiz service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Question, QuizId, QuizRecord, deserialize_timestamp};

#[derive(Debug, Serialize)]
pub(super) struct GenerateRequest<'a> {
    pub url: &'a str,
}

/// FastAPI error body, `{"detail": ...}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn message(self) -> String {
        match self.detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        }
    }
}

/// Key entities come either as a flat list or grouped by category.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum Entities {
    Flat(Vec<String>),
    Grouped(BTreeMap<String, Vec<String>>),
}

impl Default for Entities {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl Entities {
    fn flatten(self) -> Vec<String> {
        match self {
            Self::Flat(entities) => entities,
            Self::Grouped(groups) => groups.into_values().flatten().collect(),
        }
    }
}

/// Quiz body as returned by `/generate_quiz` and `/quiz/{id}`.
///
/// `/generate_quiz` answers without the submitted `url`, the stored body
/// behind `/quiz/{id}` carries neither `id`, `title` nor `url`, and neither
/// body carries a generation date, so all of these are optional here.
#[derive(Debug, Deserialize)]
pub(super) struct RecordBody {
    pub id: Option<QuizId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub date_generated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_entities: Entities,
    #[serde(default)]
    pub related_topics: Vec<String>,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub quiz: Vec<Question>,
}

impl RecordBody {
    /// Build the record, falling back to `known_id` and `submitted_url` when
    /// the body lacks an id or a source URL.
    pub fn into_record(
        self,
        known_id: Option<&QuizId>,
        submitted_url: Option<&str>,
    ) -> Option<QuizRecord> {
        let id = self.id.or_else(|| known_id.cloned())?;
        let source_url = match (self.url, submitted_url) {
            (url, Some(submitted)) if url.trim().is_empty() => submitted.to_string(),
            (url, _) => url,
        };

        Some(QuizRecord {
            id,
            title: self.title,
            source_url,
            date_generated: self.date_generated,
            summary: self.summary,
            key_entities: self.key_entities.flatten(),
            related_topics: self.related_topics,
            sections: self.sections,
            questions: self.quiz,
        })
    }
}
