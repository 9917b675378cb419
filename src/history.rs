//! Resolving quizzes for viewing and listing past quizzes.

use std::sync::Arc;

use tracing::debug;

use crate::QuizError;
use crate::models::{HistoryEntry, QuizId, QuizRecord};
use crate::service::QuizService;
use crate::session::QuizSource;

/// State carried from one screen to the next.
///
/// After a generation the record travels along so the viewing screen does
/// not have to fetch it again.
#[derive(Debug, Clone, Default)]
pub struct NavigationPayload {
    pub quiz: Option<QuizRecord>,
}

impl NavigationPayload {
    pub fn with_quiz(quiz: QuizRecord) -> Self {
        Self { quiz: Some(quiz) }
    }
}

/// Finds quizzes either in navigation state or through the quiz service.
///
/// Nothing is cached; every lookup or listing goes to the service.
pub struct HistoryResolver<S> {
    service: Arc<S>,
}

impl<S> Clone for HistoryResolver<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: QuizService> HistoryResolver<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Decide where the quiz for a view comes from. A record in the payload
    /// wins over the id; a blank id counts as no id.
    pub fn source_for_view(
        &self,
        payload: Option<NavigationPayload>,
        id: Option<QuizId>,
    ) -> Result<QuizSource, QuizError> {
        match (payload.and_then(|p| p.quiz), id) {
            (Some(quiz), _) => Ok(QuizSource::Record(quiz)),
            (None, Some(id)) if !id.is_blank() => Ok(QuizSource::Id(id)),
            (None, Some(_)) => Err(QuizError::Validation("quiz id is empty".to_string())),
            (None, None) => Err(QuizError::Validation(
                "no quiz to show: neither a quiz nor an id was given".to_string(),
            )),
        }
    }

    /// Source for a quiz opened from a history row.
    pub fn source_for_entry(&self, entry: &HistoryEntry) -> Result<QuizSource, QuizError> {
        if entry.id.is_blank() {
            return Err(QuizError::Validation("quiz id is empty".to_string()));
        }
        Ok(QuizSource::Entry(entry.clone()))
    }

    pub async fn resolve_for_view(
        &self,
        payload: Option<NavigationPayload>,
        id: Option<QuizId>,
    ) -> Result<QuizRecord, QuizError> {
        match self.source_for_view(payload, id)? {
            QuizSource::Record(quiz) => {
                debug!(id = %quiz.id, "using quiz from navigation state");
                Ok(quiz)
            }
            QuizSource::Id(id) => {
                debug!(%id, "fetching quiz for view");
                self.service.fetch_by_id(&id).await
            }
            QuizSource::Entry(entry) => {
                debug!(id = %entry.id, "fetching quiz for history row");
                let record = self.service.fetch_by_id(&entry.id).await?;
                Ok(record.with_listing_details(&entry))
            }
        }
    }

    /// All stored quizzes, in service order.
    pub async fn list_all(&self) -> Result<Vec<HistoryEntry>, QuizError> {
        self.service.list_history().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fake::{FakeService, sample_record};

    fn resolver(service: FakeService) -> (Arc<FakeService>, HistoryResolver<FakeService>) {
        let service = Arc::new(service);
        (Arc::clone(&service), HistoryResolver::new(service))
    }

    #[tokio::test]
    async fn test_navigation_record_skips_the_service() {
        let (service, resolver) = resolver(FakeService::default());
        let record = sample_record("abc123", 5);

        let resolved = resolver
            .resolve_for_view(Some(NavigationPayload::with_quiz(record.clone())), None)
            .await
            .unwrap();

        assert_eq!(resolved, record);
        assert_eq!(service.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_id_is_fetched_when_payload_is_empty() {
        let (service, resolver) = resolver(FakeService::storing(vec![sample_record("42", 3)]));

        let resolved = resolver
            .resolve_for_view(Some(NavigationPayload::default()), Some(QuizId::new("42")))
            .await
            .unwrap();

        assert_eq!(resolved.id.as_str(), "42");
        assert_eq!(service.calls(), (0, 0, 1));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (_, resolver) = resolver(FakeService::default());

        let err = resolver
            .resolve_for_view(None, Some(QuizId::new("xyz")))
            .await
            .unwrap_err();
        assert_eq!(err, QuizError::NotFound { id: QuizId::new("xyz") });
    }

    #[test]
    fn test_nothing_to_resolve_is_a_validation_error() {
        let (_, resolver) = resolver(FakeService::default());
        assert!(matches!(
            resolver.source_for_view(None, None),
            Err(QuizError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected_before_fetching() {
        let (service, resolver) = resolver(FakeService::default());

        let err = resolver
            .resolve_for_view(None, Some(QuizId::new("")))
            .await
            .unwrap_err();

        assert!(matches!(err, QuizError::Validation(_)));
        assert_eq!(service.calls(), (0, 0, 0));
    }

    #[test]
    fn test_history_row_becomes_entry_source() {
        let (_, resolver) = resolver(FakeService::default());
        let entry = sample_record("5", 1).history_entry();

        assert!(matches!(
            resolver.source_for_entry(&entry),
            Ok(QuizSource::Entry(row)) if row == entry
        ));

        let blank = HistoryEntry {
            id: QuizId::new(""),
            ..entry
        };
        assert!(matches!(
            resolver.source_for_entry(&blank),
            Err(QuizError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_all_hits_the_service_every_time() {
        let (service, resolver) = resolver(FakeService::storing(vec![
            sample_record("1", 1),
            sample_record("2", 1),
        ]));

        let first = resolver.list_all().await.unwrap();
        let second = resolver.list_all().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(service.calls(), (0, 2, 0));
    }

    #[tokio::test]
    async fn test_list_all_failure_is_surfaced() {
        let (_, resolver) = resolver(FakeService::default());
        assert!(matches!(
            resolver.list_all().await,
            Err(QuizError::HistoryUnavailable(_))
        ));
    }
}
