//! ListSessionsHandler - Filtered, sorted, paginated session listing.

use std::sync::Arc;

use crate::config::SessionsConfig;
use crate::domain::foundation::{SessionStatus, Timestamp};
use crate::domain::session::SessionError;
use crate::ports::{SessionPage, SessionQuery, SessionReader, SortField, SortOrder};

/// Listing request as received; unset values take configured defaults.
#[derive(Debug, Clone, Default)]
pub struct ListSessionsQuery {
    pub search: Option<String>,
    pub status: Option<SessionStatus>,
    pub is_public: Option<bool>,
    pub instructor: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

/// Handler for listing sessions.
pub struct ListSessionsHandler {
    reader: Arc<dyn SessionReader>,
    config: SessionsConfig,
}

impl ListSessionsHandler {
    pub fn new(reader: Arc<dyn SessionReader>, config: SessionsConfig) -> Self {
        Self { reader, config }
    }

    pub async fn handle(&self, query: ListSessionsQuery) -> Result<SessionPage, SessionError> {
        let query = self.normalize(query);
        self.reader
            .list(&query, Timestamp::now())
            .await
            .map_err(SessionError::storage)
    }

    fn normalize(&self, query: ListSessionsQuery) -> SessionQuery {
        SessionQuery {
            search: non_blank(query.search),
            status: query.status,
            is_public: query.is_public,
            instructor: non_blank(query.instructor),
            page: query.page.unwrap_or(1).max(1),
            limit: self.config.page_size(query.limit),
            sort_by: query.sort_by.unwrap_or_default(),
            sort_order: query.sort_order.unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionStore;
    use crate::domain::session::test_support::*;
    use crate::ports::SessionRepository;

    async fn seeded() -> Arc<InMemorySessionStore> {
        let store = Arc::new(InMemorySessionStore::new());
        for (instructor, days) in [("Ann Lee", 1), ("Bob Ray", 2), ("ann marie", 3), ("Cy", 4)] {
            store.save(&taught_by(session_in_days(days, 10), instructor)).await.unwrap();
        }
        store.save(&session_starting("2020-01-06T10:00:00Z", 60, 5)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn defaults_apply_when_unset() {
        let handler = ListSessionsHandler::new(seeded().await, SessionsConfig::default());

        let page = handler.handle(ListSessionsQuery::default()).await.unwrap();

        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.pagination.limit, 10);
        assert_eq!(page.pagination.total_sessions, 5);
        assert_eq!(page.sessions.len(), 5);
    }

    #[tokio::test]
    async fn status_and_instructor_filter_with_stats_over_filtered_set() {
        let handler = ListSessionsHandler::new(seeded().await, SessionsConfig::default());

        let page = handler
            .handle(ListSessionsQuery {
                status: Some(SessionStatus::Scheduled),
                instructor: Some("Ann".to_string()),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.sessions.len(), 1);
        assert_eq!(page.sessions[0].instructor, "Ann Lee");
        assert_eq!(page.pagination.total_sessions, 2);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(page.pagination.has_next_page);
        assert_eq!(page.stats.total_sessions, 2);
        assert_eq!(page.stats.scheduled, 2);
        assert_eq!(page.stats.completed, 0);
    }

    #[tokio::test]
    async fn page_size_is_clamped_and_page_zero_is_first() {
        let handler = ListSessionsHandler::new(seeded().await, SessionsConfig::default());

        let page = handler
            .handle(ListSessionsQuery {
                page: Some(0),
                limit: Some(5_000),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.pagination.limit, 100);
    }

    #[tokio::test]
    async fn blank_search_is_ignored() {
        let handler = ListSessionsHandler::new(seeded().await, SessionsConfig::default());

        let page = handler
            .handle(ListSessionsQuery {
                search: Some("   ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.total_sessions, 5);
    }

    #[tokio::test]
    async fn descending_sort_by_date() {
        let handler = ListSessionsHandler::new(seeded().await, SessionsConfig::default());

        let page = handler
            .handle(ListSessionsQuery {
                sort_by: Some(SortField::SessionDate),
                sort_order: Some(SortOrder::Desc),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.sessions[0].instructor, "Cy");
        assert_eq!(page.sessions[4].status, SessionStatus::Completed);
    }
}
