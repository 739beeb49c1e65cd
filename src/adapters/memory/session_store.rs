//! In-memory session store implementing both session ports.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, SessionStatus, Timestamp};
use crate::domain::session::{derive_status, Session};
use crate::ports::{
    Pagination, SessionPage, SessionQuery, SessionReader, SessionRepository, SessionStats,
    SessionView, SortField, SortOrder,
};

/// Sessions keyed by id behind a tokio `RwLock`.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(session: &Session, status: SessionStatus, query: &SessionQuery) -> bool {
    if let Some(search) = query.search.as_deref() {
        let hit = contains_ci(session.class_title(), search)
            || session
                .description()
                .is_some_and(|d| contains_ci(d, search))
            || contains_ci(session.instructor(), search);
        if !hit {
            return false;
        }
    }
    if query.status.is_some_and(|wanted| wanted != status) {
        return false;
    }
    if query.is_public.is_some_and(|wanted| wanted != session.is_public()) {
        return false;
    }
    if let Some(instructor) = query.instructor.as_deref() {
        if !contains_ci(session.instructor(), instructor) {
            return false;
        }
    }
    true
}

fn compare(a: &SessionView, b: &SessionView, field: SortField) -> Ordering {
    match field {
        SortField::SessionDate => a.full_date_time.cmp(&b.full_date_time),
        SortField::StartTime => a.start_time.cmp(&b.start_time),
        SortField::ClassTitle => a.class_title.cmp(&b.class_title),
        SortField::Instructor => a.instructor.cmp(&b.instructor),
        SortField::Duration => a.duration.cmp(&b.duration),
        SortField::MaxParticipants => a.max_participants.cmp(&b.max_participants),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(session.id()).ok_or_else(|| {
            DomainError::new(ErrorCode::SessionNotFound, "Session not found")
                .with_detail("session_id", session.id().to_string())
        })?;

        if stored.version() != session.version() {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "Session was modified: expected version {}, found {}",
                    session.version(),
                    stored.version()
                ),
            ));
        }

        let mut next = session.clone();
        next.increment_version();
        *stored = next;
        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::new(ErrorCode::SessionNotFound, "Session not found"))
    }
}

#[async_trait]
impl SessionReader for InMemorySessionStore {
    async fn get_by_id(
        &self,
        id: &SessionId,
        now: Timestamp,
    ) -> Result<Option<SessionView>, DomainError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(id)
            .map(|s| SessionView::from_session(s, now)))
    }

    async fn list(&self, query: &SessionQuery, now: Timestamp) -> Result<SessionPage, DomainError> {
        let sessions = self.sessions.read().await;

        let mut stats = SessionStats::default();
        let mut views: Vec<SessionView> = sessions
            .values()
            .filter_map(|session| {
                let status = derive_status(session, now);
                matches(session, status, query).then(|| {
                    stats.record(status, session.enrolled_count() as u64);
                    SessionView::from_session(session, now)
                })
            })
            .collect();

        views.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            let ord = match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });

        let total = views.len() as u64;
        let page: Vec<SessionView> = views
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(SessionPage {
            sessions: page,
            pagination: Pagination::new(query.page, query.limit, total),
            stats,
        })
    }

    async fn list_upcoming(
        &self,
        limit: u32,
        now: Timestamp,
    ) -> Result<Vec<SessionView>, DomainError> {
        let sessions = self.sessions.read().await;
        let mut upcoming: Vec<SessionView> = sessions
            .values()
            .filter(|s| {
                s.is_public()
                    && s.full_date_time().is_after(&now)
                    && derive_status(s, now) == SessionStatus::Scheduled
            })
            .map(|s| SessionView::from_session(s, now))
            .collect();

        upcoming.sort_by(|a, b| {
            a.full_date_time
                .cmp(&b.full_date_time)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        upcoming.truncate(limit as usize);
        Ok(upcoming)
    }
}
