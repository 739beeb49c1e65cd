//! CreateSessionHandler - Command handler for scheduling new sessions.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, Timestamp, UserId};
use crate::domain::session::{Session, SessionDraft, SessionError};
use crate::ports::SessionRepository;

/// Command to schedule a new session.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub draft: SessionDraft,
    /// Staff member issuing the command, for the audit log
    pub created_by: UserId,
}

/// Handler for creating sessions.
pub struct CreateSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl CreateSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: CreateSessionCommand) -> Result<Session, SessionError> {
        let session = Session::create(SessionId::new(), cmd.draft, Timestamp::now())?;

        self.repository
            .save(&session)
            .await
            .map_err(SessionError::storage)?;

        tracing::info!(
            session_id = %session.id(),
            created_by = %cmd.created_by,
            starts_at = %session.full_date_time(),
            "Session created"
        );

        Ok(session)
    }
}
