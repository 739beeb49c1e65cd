//! Session aggregate entity.
//!
//! A session is one scheduled live class hosted on an external meeting
//! service, together with the users enrolled in it.
//!
//! # Invariants
//!
//! - `enrolled_participants.len() <= max_participants`
//! - no user id appears twice in `enrolled_participants`
//! - `status` only moves forward (see `SessionStatus`)
//! - `meeting_link` always matches an accepted provider pattern

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, SessionStatus, Timestamp, UserId};

use super::schedule::{MeetingLink, StartTime};

/// Maximum length for the class title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for the description.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Maximum length for the instructor name.
pub const MAX_INSTRUCTOR_LENGTH: usize = 100;

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 480;

pub const DEFAULT_MAX_PARTICIPANTS: i32 = 50;
pub const MIN_PARTICIPANTS: i32 = 1;
pub const MAX_PARTICIPANTS: i32 = 1000;

/// One reserved seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: UserId,
    pub enrolled_at: Timestamp,
}

/// Session aggregate - a scheduled live class with capacity-bound enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub(super) id: SessionId,
    pub(super) class_title: String,
    pub(super) thumbnail: String,
    pub(super) session_date: NaiveDate,
    pub(super) start_time: StartTime,
    pub(super) meeting_link: MeetingLink,
    pub(super) description: Option<String>,
    pub(super) duration_minutes: i32,
    pub(super) instructor: String,
    pub(super) max_participants: i32,
    pub(super) enrolled_participants: Vec<Participant>,
    pub(super) status: SessionStatus,
    pub(super) is_public: bool,
    pub(super) version: i64,
    pub(super) created_at: Timestamp,
    pub(super) updated_at: Timestamp,
}

/// Stored state of a session, used to rebuild it from persistence.
#[derive(Debug, Clone)]
pub struct SessionParts {
    pub id: SessionId,
    pub class_title: String,
    pub thumbnail: String,
    pub session_date: NaiveDate,
    pub start_time: StartTime,
    pub meeting_link: MeetingLink,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub instructor: String,
    pub max_participants: i32,
    pub enrolled_participants: Vec<Participant>,
    pub status: SessionStatus,
    pub is_public: bool,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    /// Reconstitute a session from persistence (no validation).
    pub fn reconstitute(parts: SessionParts) -> Self {
        Self {
            id: parts.id,
            class_title: parts.class_title,
            thumbnail: parts.thumbnail,
            session_date: parts.session_date,
            start_time: parts.start_time,
            meeting_link: parts.meeting_link,
            description: parts.description,
            duration_minutes: parts.duration_minutes,
            instructor: parts.instructor,
            max_participants: parts.max_participants,
            enrolled_participants: parts.enrolled_participants,
            status: parts.status,
            is_public: parts.is_public,
            version: parts.version,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn class_title(&self) -> &str {
        &self.class_title
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    pub fn session_date(&self) -> NaiveDate {
        self.session_date
    }

    pub fn start_time(&self) -> StartTime {
        self.start_time
    }

    pub fn meeting_link(&self) -> &MeetingLink {
        &self.meeting_link
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn duration_minutes(&self) -> i32 {
        self.duration_minutes
    }

    pub fn instructor(&self) -> &str {
        &self.instructor
    }

    pub fn max_participants(&self) -> i32 {
        self.max_participants
    }

    pub fn enrolled_participants(&self) -> &[Participant] {
        &self.enrolled_participants
    }

    /// Stored status. Use `derive_status` for the time-consistent value.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Optimistic concurrency token.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived values
    // ─────────────────────────────────────────────────────────────────────────

    pub fn enrolled_count(&self) -> i32 {
        self.enrolled_participants.len() as i32
    }

    pub fn available_spots(&self) -> i32 {
        self.max_participants - self.enrolled_count()
    }

    pub fn is_full(&self) -> bool {
        self.enrolled_count() >= self.max_participants
    }

    /// Session date combined with the start time, read as UTC.
    pub fn full_date_time(&self) -> Timestamp {
        Timestamp::from_date_and_time(self.session_date, self.start_time.as_naive_time())
    }

    pub fn end_date_time(&self) -> Timestamp {
        self.full_date_time()
            .plus_minutes(i64::from(self.duration_minutes))
    }

    /// Bumps the version after a successful persisted write.
    pub fn increment_version(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{DateTime, Utc};

    pub fn at(rfc3339: &str) -> Timestamp {
        Timestamp::from_datetime(
            DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    /// A scheduled session starting at `starts_at` (UTC, minute precision).
    pub fn session_starting(starts_at: &str, duration: i32, capacity: i32) -> Session {
        let start = at(starts_at);
        let created = start.minus_days(7);
        Session::reconstitute(SessionParts {
            id: SessionId::new(),
            class_title: "Intro to Rust".to_string(),
            thumbnail: "https://cdn.example.com/rust.png".to_string(),
            session_date: start.date(),
            start_time: StartTime::parse(&start.as_datetime().format("%H:%M").to_string())
                .unwrap(),
            meeting_link: MeetingLink::parse("https://zoom.us/j/12345").unwrap(),
            description: None,
            duration_minutes: duration,
            instructor: "Ann Lee".to_string(),
            max_participants: capacity,
            enrolled_participants: Vec::new(),
            status: SessionStatus::Scheduled,
            is_public: true,
            version: 1,
            created_at: created,
            updated_at: created,
        })
    }

    /// A scheduled session starting `days` from the real clock.
    pub fn session_in_days(days: i64, capacity: i32) -> Session {
        let start = Timestamp::now().plus_days(days);
        session_starting(&start.as_datetime().to_rfc3339(), 60, capacity)
    }

    pub fn taught_by(mut session: Session, instructor: &str) -> Session {
        session.instructor = instructor.to_string();
        session
    }

    pub fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[test]
    fn full_date_time_combines_date_and_start() {
        let session = session_starting("2026-11-02T09:30:00Z", 90, 10);
        assert_eq!(session.full_date_time(), at("2026-11-02T09:30:00Z"));
        assert_eq!(session.end_date_time(), at("2026-11-02T11:00:00Z"));
    }

    #[test]
    fn available_spots_tracks_capacity() {
        let session = session_starting("2026-11-02T09:30:00Z", 60, 3);
        assert_eq!(session.enrolled_count(), 0);
        assert_eq!(session.available_spots(), 3);
        assert!(!session.is_full());
    }

    #[test]
    fn increment_version_bumps_by_one() {
        let mut session = session_starting("2026-11-02T09:30:00Z", 60, 3);
        session.increment_version();
        assert_eq!(session.version(), 2);
    }

    #[test]
    fn participant_serializes_camel_case() {
        let p = super::Participant {
            user_id: user("u-1"),
            enrolled_at: at("2026-11-01T10:00:00Z"),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["userId"], "u-1");
        assert!(json["enrolledAt"].as_str().unwrap().starts_with("2026-11-01"));
    }
}
