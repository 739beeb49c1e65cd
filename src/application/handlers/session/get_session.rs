//! GetSessionHandler - Query handler for a single session.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::SessionError;
use crate::ports::{SessionReader, SessionView};

/// Query to get a session by ID.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
}

/// Handler for retrieving session details.
pub struct GetSessionHandler {
    reader: Arc<dyn SessionReader>,
}

impl GetSessionHandler {
    pub fn new(reader: Arc<dyn SessionReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<SessionView, SessionError> {
        self.reader
            .get_by_id(&query.session_id, Timestamp::now())
            .await
            .map_err(SessionError::storage)?
            .ok_or(SessionError::NotFound(query.session_id))
    }
}
