//! EnrollHandler - Reserves a seat in a session for the caller.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{Session, SessionError};
use crate::ports::SessionRepository;

use super::versioned_write::modify_with_retry;

#[derive(Debug, Clone)]
pub struct EnrollCommand {
    pub session_id: SessionId,
    pub user_id: UserId,
}

/// Handler for enrollment.
///
/// The capacity check and the write are one versioned compare-and-set, so
/// concurrent enrollments can never overfill a session.
pub struct EnrollHandler {
    repository: Arc<dyn SessionRepository>,
    max_attempts: u32,
}

impl EnrollHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, max_attempts: u32) -> Self {
        Self {
            repository,
            max_attempts,
        }
    }

    pub async fn handle(&self, cmd: EnrollCommand) -> Result<Session, SessionError> {
        let user_id = cmd.user_id;
        let session = modify_with_retry(
            self.repository.as_ref(),
            cmd.session_id,
            self.max_attempts,
            |session, now| session.enroll(user_id.clone(), now).map(|()| true),
        )
        .await?;

        tracing::info!(
            session_id = %cmd.session_id,
            user_id = %user_id,
            enrolled = session.enrolled_count(),
            capacity = session.max_participants(),
            "User enrolled"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionStore;
    use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
    use crate::domain::session::test_support::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn setup(capacity: i32) -> (Arc<InMemorySessionStore>, EnrollHandler, SessionId) {
        let store = Arc::new(InMemorySessionStore::new());
        let session = session_in_days(2, capacity);
        store.save(&session).await.unwrap();
        (store.clone(), EnrollHandler::new(store, 5), *session.id())
    }

    fn enroll(id: SessionId, who: &str) -> EnrollCommand {
        EnrollCommand {
            session_id: id,
            user_id: user(who),
        }
    }

    /// Lets a rival take the last seat right before the first write lands.
    struct RivalTakesLastSeat {
        inner: InMemorySessionStore,
        fired: AtomicBool,
    }

    #[async_trait]
    impl SessionRepository for RivalTakesLastSeat {
        async fn save(&self, session: &Session) -> Result<(), DomainError> {
            self.inner.save(session).await
        }

        async fn update(&self, session: &Session) -> Result<(), DomainError> {
            if !self.fired.swap(true, Ordering::SeqCst) {
                let mut rival = self
                    .inner
                    .find_by_id(session.id())
                    .await?
                    .expect("seeded session");
                rival
                    .enroll(user("rival"), Timestamp::now())
                    .expect("seat available");
                self.inner.update(&rival).await?;
            }
            self.inner.update(session).await
        }

        async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
            self.inner.find_by_id(id).await
        }

        async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn enrolls_caller() {
        let (store, handler, id) = setup(3).await;

        let session = handler.handle(enroll(id, "u-1")).await.unwrap();

        assert!(session.is_enrolled(&user("u-1")));
        assert_eq!(session.version(), 2);
        assert_eq!(store.find_by_id(&id).await.unwrap().unwrap().enrolled_count(), 1);
    }

    #[tokio::test]
    async fn second_enrollment_is_rejected_without_duplicate() {
        let (store, handler, id) = setup(3).await;
        handler.handle(enroll(id, "u-1")).await.unwrap();

        let result = handler.handle(enroll(id, "u-1")).await;

        assert_eq!(result.unwrap_err(), SessionError::AlreadyEnrolled(user("u-1")));
        assert_eq!(store.find_by_id(&id).await.unwrap().unwrap().enrolled_count(), 1);
    }

    #[tokio::test]
    async fn full_session_is_rejected() {
        let (_, handler, id) = setup(1).await;
        handler.handle(enroll(id, "u-1")).await.unwrap();

        let result = handler.handle(enroll(id, "u-2")).await;
        assert_eq!(result.unwrap_err(), SessionError::SessionFull);
    }

    #[tokio::test]
    async fn past_session_is_rejected() {
        let store = Arc::new(InMemorySessionStore::new());
        let past = session_starting("2020-01-06T10:00:00Z", 60, 5);
        store.save(&past).await.unwrap();
        let handler = EnrollHandler::new(store, 5);

        let result = handler.handle(enroll(*past.id(), "u-1")).await;
        assert_eq!(result.unwrap_err(), SessionError::SessionInPast);
    }

    #[tokio::test]
    async fn cancelled_session_is_rejected() {
        let (store, handler, id) = setup(3).await;
        let mut cancelled = store.find_by_id(&id).await.unwrap().unwrap();
        cancelled.cancel(Timestamp::now()).unwrap();
        store.update(&cancelled).await.unwrap();

        let result = handler.handle(enroll(id, "u-1")).await;
        assert_eq!(result.unwrap_err(), SessionError::SessionCancelled);
    }

    #[tokio::test]
    async fn conflict_rechecks_capacity_against_fresh_state() {
        let repo = Arc::new(RivalTakesLastSeat {
            inner: InMemorySessionStore::new(),
            fired: AtomicBool::new(false),
        });
        let session = session_in_days(2, 1);
        repo.save(&session).await.unwrap();
        let handler = EnrollHandler::new(repo.clone(), 5);

        let result = handler.handle(enroll(*session.id(), "u-1")).await;

        assert_eq!(result.unwrap_err(), SessionError::SessionFull);
        let stored = repo.find_by_id(session.id()).await.unwrap().unwrap();
        assert_eq!(stored.enrolled_count(), 1);
        assert!(stored.is_enrolled(&user("rival")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enrollments_for_last_seat_admit_exactly_one() {
        let (store, handler, id) = setup(1).await;
        let handler = Arc::new(handler);

        let a = tokio::spawn({
            let handler = handler.clone();
            async move { handler.handle(enroll(id, "a")).await }
        });
        let b = tokio::spawn({
            let handler = handler.clone();
            async move { handler.handle(enroll(id, "b")).await }
        });
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(SessionError::SessionFull))));
        assert_eq!(store.find_by_id(&id).await.unwrap().unwrap().enrolled_count(), 1);
    }

    #[tokio::test]
    async fn storage_error_is_not_retried() {
        struct Broken;

        #[async_trait]
        impl SessionRepository for Broken {
            async fn save(&self, _: &Session) -> Result<(), DomainError> {
                Ok(())
            }
            async fn update(&self, _: &Session) -> Result<(), DomainError> {
                Ok(())
            }
            async fn find_by_id(&self, _: &SessionId) -> Result<Option<Session>, DomainError> {
                Err(DomainError::new(ErrorCode::DatabaseError, "connection refused"))
            }
            async fn delete(&self, _: &SessionId) -> Result<(), DomainError> {
                Ok(())
            }
        }

        let handler = EnrollHandler::new(Arc::new(Broken), 5);
        let result = handler.handle(enroll(SessionId::new(), "u-1")).await;

        assert!(matches!(result, Err(SessionError::Storage(msg)) if msg.contains("connection refused")));
    }
}
