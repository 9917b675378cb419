use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use tracing::warn;

use crate::QuizError;

/// Opaque quiz identifier assigned by the quiz service.
///
/// The service hands out integers today, so decoding accepts either a JSON
/// string or a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace only; never a valid service id.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuizId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for QuizId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for QuizId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "answer")]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    /// Advisory label such as `easy`, `medium` or `hard`.
    #[serde(default)]
    pub difficulty: String,
}

impl Question {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }

    /// Position of the correct answer within `options`.
    pub fn correct_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|option| *option == self.correct_answer)
    }

    fn check(&self) -> Result<(), String> {
        if self.options.len() < 2 {
            return Err(format!(
                "expected at least 2 options, found {}",
                self.options.len()
            ));
        }

        for (index, option) in self.options.iter().enumerate() {
            if self.options[..index].contains(option) {
                return Err(format!("option `{option}` appears more than once"));
            }
        }

        if !self.has_option(&self.correct_answer) {
            return Err(format!(
                "answer `{}` is not one of the options",
                self.correct_answer
            ));
        }

        Ok(())
    }
}

/// A generated quiz as stored by the quiz service.
///
/// Records are never modified once received; play state lives in the
/// session that wraps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizRecord {
    pub id: QuizId,
    pub title: String,
    #[serde(rename = "url")]
    pub source_url: String,
    pub date_generated: Option<DateTime<Utc>>,
    pub summary: String,
    /// Ordered by extraction rank.
    pub key_entities: Vec<String>,
    pub related_topics: Vec<String>,
    pub sections: Vec<String>,
    #[serde(rename = "quiz")]
    pub questions: Vec<Question>,
}

impl QuizRecord {
    /// Check the per-question invariants required for play.
    pub fn validate(&self) -> Result<(), QuizError> {
        for (question, item) in self.questions.iter().enumerate() {
            item.check()
                .map_err(|reason| QuizError::MalformedQuiz { question, reason })?;
        }
        Ok(())
    }

    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry::from(self)
    }

    /// Fill in fields the stored quiz body leaves out from the history row
    /// it was opened from. Fields the body does carry are kept.
    pub fn with_listing_details(mut self, entry: &HistoryEntry) -> Self {
        if self.title.trim().is_empty() {
            self.title = entry.title.clone();
        }
        if self.source_url.trim().is_empty() {
            self.source_url = entry.source_url.clone();
        }
        if self.date_generated.is_none() {
            self.date_generated = entry.date_generated;
        }
        self
    }
}

/// Listing projection of a [`QuizRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: QuizId,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "url", default)]
    pub source_url: String,
    /// `None` when missing or unreadable; one bad row never hides the rest.
    #[serde(default, deserialize_with = "deserialize_listing_timestamp")]
    pub date_generated: Option<DateTime<Utc>>,
}

impl From<&QuizRecord> for HistoryEntry {
    fn from(record: &QuizRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            source_url: record.source_url.clone(),
            date_generated: record.date_generated,
        }
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO-8601 ones (taken as UTC).
pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|text| {
        parse_timestamp(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{text}`")))
    })
    .transpose()
}

fn deserialize_listing_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => {
            let stamp = parse_timestamp(&text);
            if stamp.is_none() {
                warn!(%text, "ignoring unreadable history timestamp");
            }
            stamp
        }
        Some(other) => {
            warn!(%other, "ignoring non-string history timestamp");
            None
        }
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}
