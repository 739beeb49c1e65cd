//! ListUpcomingSessionsHandler - Public sessions that have not started yet.

use std::sync::Arc;

use crate::config::SessionsConfig;
use crate::domain::foundation::Timestamp;
use crate::domain::session::SessionError;
use crate::ports::{SessionReader, SessionView};

#[derive(Debug, Clone, Default)]
pub struct ListUpcomingSessionsQuery {
    pub limit: Option<u32>,
}

/// Handler for the upcoming-sessions feed.
pub struct ListUpcomingSessionsHandler {
    reader: Arc<dyn SessionReader>,
    config: SessionsConfig,
}

impl ListUpcomingSessionsHandler {
    pub fn new(reader: Arc<dyn SessionReader>, config: SessionsConfig) -> Self {
        Self { reader, config }
    }

    pub async fn handle(
        &self,
        query: ListUpcomingSessionsQuery,
    ) -> Result<Vec<SessionView>, SessionError> {
        let limit = match query.limit {
            None | Some(0) => self.config.upcoming_limit,
            Some(n) => n.min(self.config.max_page_size),
        };

        self.reader
            .list_upcoming(limit, Timestamp::now())
            .await
            .map_err(SessionError::storage)
    }
}
