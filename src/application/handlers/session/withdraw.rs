//! WithdrawHandler - Releases the caller's seat in a session.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{Session, SessionError};
use crate::ports::SessionRepository;

use super::versioned_write::modify_with_retry;

#[derive(Debug, Clone)]
pub struct WithdrawCommand {
    pub session_id: SessionId,
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct WithdrawResult {
    pub session: Session,
    /// False when the caller held no seat.
    pub withdrawn: bool,
}

/// Handler for withdrawal. Withdrawing twice is a no-op.
pub struct WithdrawHandler {
    repository: Arc<dyn SessionRepository>,
    max_attempts: u32,
}

impl WithdrawHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, max_attempts: u32) -> Self {
        Self {
            repository,
            max_attempts,
        }
    }

    pub async fn handle(&self, cmd: WithdrawCommand) -> Result<WithdrawResult, SessionError> {
        let user_id = cmd.user_id;
        let mut withdrawn = false;
        let session = modify_with_retry(
            self.repository.as_ref(),
            cmd.session_id,
            self.max_attempts,
            |session, now| {
                withdrawn = session.withdraw(&user_id, now);
                Ok(withdrawn)
            },
        )
        .await?;

        if withdrawn {
            tracing::info!(session_id = %cmd.session_id, user_id = %user_id, "User withdrew");
        } else {
            tracing::debug!(session_id = %cmd.session_id, user_id = %user_id, "Withdraw without enrollment");
        }

        Ok(WithdrawResult { session, withdrawn })
    }
}
