//! Load, modify, and persist a session under optimistic locking.

use crate::domain::foundation::{ErrorCode, SessionId, Timestamp};
use crate::domain::session::{Session, SessionError};
use crate::ports::SessionRepository;

/// Runs `op` against a fresh copy of the session and writes the result.
///
/// The session's status is re-derived before `op` sees it. `op` returns
/// whether it changed anything; untouched sessions are not written. A
/// version conflict reloads and runs `op` again, so its preconditions are
/// always checked against the state that actually gets persisted.
///
/// # Errors
///
/// - whatever `op` rejects with
/// - `NotFound` if the session is missing or deleted mid-retry
/// - `Conflict` once `max_attempts` writes have lost the race
pub(super) async fn modify_with_retry<F>(
    repository: &dyn SessionRepository,
    id: SessionId,
    max_attempts: u32,
    mut op: F,
) -> Result<Session, SessionError>
where
    F: FnMut(&mut Session, Timestamp) -> Result<bool, SessionError> + Send,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let now = Timestamp::now();
        let mut session = repository
            .find_by_id(&id)
            .await
            .map_err(SessionError::storage)?
            .ok_or(SessionError::NotFound(id))?;

        let refreshed = session.refresh_status(now);
        let changed = op(&mut session, now)?;
        if !refreshed && !changed {
            return Ok(session);
        }

        match repository.update(&session).await {
            Ok(()) => {
                session.increment_version();
                return Ok(session);
            }
            Err(err) if err.code == ErrorCode::ConcurrencyConflict => {
                tracing::warn!(session_id = %id, attempt, "Version conflict, reloading session");
            }
            Err(err) => return Err(SessionError::from_store(err, id)),
        }
    }

    tracing::warn!(session_id = %id, max_attempts, "Giving up after repeated version conflicts");
    Err(SessionError::Conflict(id))
}
