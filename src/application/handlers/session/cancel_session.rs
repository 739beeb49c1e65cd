//! CancelSessionHandler - Cancels a scheduled or running session.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{Session, SessionError};
use crate::ports::SessionRepository;

use super::versioned_write::modify_with_retry;

#[derive(Debug, Clone)]
pub struct CancelSessionCommand {
    pub session_id: SessionId,
    pub cancelled_by: UserId,
}

/// Handler for cancelling sessions. Enrollments are kept.
pub struct CancelSessionHandler {
    repository: Arc<dyn SessionRepository>,
    max_attempts: u32,
}

impl CancelSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, max_attempts: u32) -> Self {
        Self {
            repository,
            max_attempts,
        }
    }

    pub async fn handle(&self, cmd: CancelSessionCommand) -> Result<Session, SessionError> {
        let session = modify_with_retry(
            self.repository.as_ref(),
            cmd.session_id,
            self.max_attempts,
            |session, now| session.cancel(now).map(|()| true),
        )
        .await?;

        tracing::info!(
            session_id = %cmd.session_id,
            cancelled_by = %cmd.cancelled_by,
            enrolled = session.enrolled_count(),
            "Session cancelled"
        );

        Ok(session)
    }
}
