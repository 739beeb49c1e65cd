//! UpdateSessionHandler - Administrative partial update of a session.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{Session, SessionError, SessionPatch};
use crate::ports::SessionRepository;

use super::versioned_write::modify_with_retry;

/// Command to update a session's fields.
#[derive(Debug, Clone)]
pub struct UpdateSessionCommand {
    pub session_id: SessionId,
    pub patch: SessionPatch,
    pub updated_by: UserId,
}

/// Handler for updating sessions.
pub struct UpdateSessionHandler {
    repository: Arc<dyn SessionRepository>,
    max_attempts: u32,
}

impl UpdateSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, max_attempts: u32) -> Self {
        Self {
            repository,
            max_attempts,
        }
    }

    pub async fn handle(&self, cmd: UpdateSessionCommand) -> Result<Session, SessionError> {
        let patch = cmd.patch;
        let session = modify_with_retry(
            self.repository.as_ref(),
            cmd.session_id,
            self.max_attempts,
            |session, now| session.apply_patch(patch.clone(), now),
        )
        .await?;

        tracing::info!(
            session_id = %cmd.session_id,
            updated_by = %cmd.updated_by,
            version = session.version(),
            "Session updated"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionStore;
    use crate::domain::foundation::{SessionStatus, Timestamp};
    use crate::domain::session::test_support::*;

    async fn setup(capacity: i32) -> (Arc<InMemorySessionStore>, UpdateSessionHandler, Session) {
        let store = Arc::new(InMemorySessionStore::new());
        let session = session_in_days(3, capacity);
        store.save(&session).await.unwrap();
        let handler = UpdateSessionHandler::new(store.clone(), 5);
        (store, handler, session)
    }

    fn command(session: &Session, patch: SessionPatch) -> UpdateSessionCommand {
        UpdateSessionCommand {
            session_id: *session.id(),
            patch,
            updated_by: user("admin-1"),
        }
    }

    #[tokio::test]
    async fn applies_supplied_fields_only() {
        let (store, handler, session) = setup(10).await;

        let updated = handler
            .handle(command(
                &session,
                SessionPatch {
                    class_title: Some("Advanced Rust".to_string()),
                    duration: Some(90),
                    ..Default::default()
                },
            ))
            .await
            .unwrap();

        assert_eq!(updated.class_title(), "Advanced Rust");
        assert_eq!(updated.duration_minutes(), 90);
        assert_eq!(updated.instructor(), session.instructor());
        assert_eq!(updated.version(), 2);
        assert_eq!(store.find_by_id(session.id()).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn empty_patch_does_not_write() {
        let (store, handler, session) = setup(10).await;

        let result = handler
            .handle(command(&session, SessionPatch::default()))
            .await
            .unwrap();

        assert_eq!(result.version(), 1);
        assert_eq!(store.find_by_id(session.id()).await.unwrap().unwrap().version(), 1);
    }

    #[tokio::test]
    async fn capacity_below_enrollment_is_rejected() {
        let (store, handler, session) = setup(10).await;
        let mut enrolled = session.clone();
        enrolled.enroll(user("u-1"), Timestamp::now()).unwrap();
        enrolled.enroll(user("u-2"), Timestamp::now()).unwrap();
        store.update(&enrolled).await.unwrap();

        let result = handler
            .handle(command(
                &session,
                SessionPatch {
                    max_participants: Some(1),
                    ..Default::default()
                },
            ))
            .await;

        match result {
            Err(SessionError::Validation(errors)) => assert!(errors.has_field("maxParticipants")),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn status_cancelled_cancels() {
        let (_, handler, session) = setup(10).await;

        let updated = handler
            .handle(command(
                &session,
                SessionPatch {
                    status: Some("cancelled".to_string()),
                    ..Default::default()
                },
            ))
            .await
            .unwrap();

        assert_eq!(updated.status(), SessionStatus::Cancelled);
    }

    #[tokio::test]
    async fn other_explicit_status_is_rejected() {
        let (_, handler, session) = setup(10).await;

        let result = handler
            .handle(command(
                &session,
                SessionPatch {
                    status: Some("completed".to_string()),
                    ..Default::default()
                },
            ))
            .await;

        assert!(matches!(result, Err(SessionError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let (_, handler, _) = setup(10).await;
        let id = SessionId::new();

        let result = handler
            .handle(UpdateSessionCommand {
                session_id: id,
                patch: SessionPatch {
                    is_public: Some(false),
                    ..Default::default()
                },
                updated_by: user("admin-1"),
            })
            .await;

        assert_eq!(result.unwrap_err(), SessionError::NotFound(id));
    }
}
