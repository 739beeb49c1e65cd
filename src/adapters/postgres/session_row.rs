//! Row mapping shared by the session repository and reader.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;

use crate::domain::foundation::{DomainError, SessionId, SessionStatus, Timestamp};
use crate::domain::session::{MeetingLink, Participant, Session, SessionParts, StartTime};

/// Column list of the `sessions` table, in `SessionRow` order.
pub(super) const SESSION_COLUMNS: &str = "id, class_title, thumbnail, session_date, start_time, \
     meeting_link, description, duration_minutes, instructor, max_participants, \
     enrolled_participants, status, is_public, version, created_at, updated_at";

/// Internal row type for sqlx query mapping.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct SessionRow {
    id: uuid::Uuid,
    class_title: String,
    thumbnail: String,
    session_date: NaiveDate,
    start_time: String,
    meeting_link: String,
    description: Option<String>,
    duration_minutes: i32,
    instructor: String,
    max_participants: i32,
    enrolled_participants: Json<Vec<Participant>>,
    status: String,
    is_public: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRow {
    pub(super) fn into_session(self) -> Result<Session, DomainError> {
        let id = self.id;
        let corrupt = |column: &str, e: &dyn std::fmt::Display| {
            DomainError::database(format!("Invalid {} in session {}: {}", column, id, e))
        };

        let start_time =
            StartTime::parse(&self.start_time).map_err(|e| corrupt("start_time", &e))?;
        let meeting_link =
            MeetingLink::parse(&self.meeting_link).map_err(|e| corrupt("meeting_link", &e))?;
        let status: SessionStatus = self.status.parse().map_err(|e| corrupt("status", &e))?;

        Ok(Session::reconstitute(SessionParts {
            id: SessionId::from_uuid(id),
            class_title: self.class_title,
            thumbnail: self.thumbnail,
            session_date: self.session_date,
            start_time,
            meeting_link,
            description: self.description,
            duration_minutes: self.duration_minutes,
            instructor: self.instructor,
            max_participants: self.max_participants,
            enrolled_participants: self.enrolled_participants.0,
            status,
            is_public: self.is_public,
            version: self.version,
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        }))
    }
}

/// Maps a sqlx failure into the port error currency.
pub(super) fn db_error(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        DomainError::database(format!("{}: {}", context, e))
    }
}
