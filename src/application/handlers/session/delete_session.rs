//! DeleteSessionHandler - Removes a session and its enrollments.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::SessionError;
use crate::ports::SessionRepository;

#[derive(Debug, Clone)]
pub struct DeleteSessionCommand {
    pub session_id: SessionId,
    pub deleted_by: UserId,
}

/// Handler for deleting sessions.
pub struct DeleteSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl DeleteSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: DeleteSessionCommand) -> Result<(), SessionError> {
        self.repository
            .delete(&cmd.session_id)
            .await
            .map_err(|e| SessionError::from_store(e, cmd.session_id))?;

        tracing::info!(
            session_id = %cmd.session_id,
            deleted_by = %cmd.deleted_by,
            "Session deleted"
        );
        Ok(())
    }
}
