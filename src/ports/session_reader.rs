//! Session reader port (read side / CQRS queries).
//!
//! Every read is evaluated at a caller-supplied instant: the status in a
//! view, the status filter, and the status counts all use the
//! time-derived status rather than whatever was last written.

use crate::domain::foundation::{DomainError, SessionId, SessionStatus, Timestamp};
use crate::domain::session::{derive_status, MeetingProvider, Participant, Session};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reader port for session queries.
#[async_trait]
pub trait SessionReader: Send + Sync {
    /// Get detailed session view by ID.
    ///
    /// Returns `None` if not found.
    async fn get_by_id(
        &self,
        id: &SessionId,
        now: Timestamp,
    ) -> Result<Option<SessionView>, DomainError>;

    /// Filtered, sorted, paginated listing with stats over the whole filtered set.
    async fn list(&self, query: &SessionQuery, now: Timestamp) -> Result<SessionPage, DomainError>;

    /// Public sessions that are still scheduled and start after `now`,
    /// soonest first.
    async fn list_upcoming(
        &self,
        limit: u32,
        now: Timestamp,
    ) -> Result<Vec<SessionView>, DomainError>;
}

/// Whitelisted sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    SessionDate,
    StartTime,
    ClassTitle,
    Instructor,
    Duration,
    MaxParticipants,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sessionDate" => Ok(SortField::SessionDate),
            "startTime" => Ok(SortField::StartTime),
            "classTitle" => Ok(SortField::ClassTitle),
            "instructor" => Ok(SortField::Instructor),
            "duration" => Ok(SortField::Duration),
            "maxParticipants" => Ok(SortField::MaxParticipants),
            "status" => Ok(SortField::Status),
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            other => Err(format!("cannot sort by '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

/// Filters, page, and sort for `SessionReader::list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    /// Case-insensitive substring over title, description, and instructor.
    pub search: Option<String>,
    /// Matched against the time-derived status.
    pub status: Option<SessionStatus>,
    pub is_public: Option<bool>,
    /// Case-insensitive substring.
    pub instructor: Option<String>,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for SessionQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            is_public: None,
            instructor: None,
            page: 1,
            limit: 10,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl SessionQuery {
    /// Rows to skip for the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Pagination metadata for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_sessions: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            current_page: page,
            total_pages,
            total_sessions: total,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
            limit,
        }
    }
}

/// Aggregates over the filtered set, ignoring pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: u64,
    pub scheduled: u64,
    pub ongoing: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub total_enrolled: u64,
}

impl SessionStats {
    /// Counts one session with its effective status.
    pub fn record(&mut self, status: SessionStatus, enrolled: u64) {
        self.total_sessions += 1;
        self.total_enrolled += enrolled;
        match status {
            SessionStatus::Scheduled => self.scheduled += 1,
            SessionStatus::Ongoing => self.ongoing += 1,
            SessionStatus::Completed => self.completed += 1,
            SessionStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// One page of sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    pub sessions: Vec<SessionView>,
    pub pagination: Pagination,
    pub stats: SessionStats,
}

/// Session as shown to callers, with derived values filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub class_title: String,
    pub thumbnail: String,
    pub session_date: NaiveDate,
    pub start_time: String,
    pub meeting_link: String,
    pub meeting_provider: MeetingProvider,
    pub description: Option<String>,
    pub duration: i32,
    pub instructor: String,
    pub max_participants: i32,
    pub enrolled_participants: Vec<Participant>,
    pub enrolled_count: i32,
    pub available_spots: i32,
    /// Time-derived status at the instant the view was built.
    pub status: SessionStatus,
    pub is_public: bool,
    pub full_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SessionView {
    /// Builds the view of `session` as of `now`.
    pub fn from_session(session: &Session, now: Timestamp) -> Self {
        Self {
            id: *session.id(),
            class_title: session.class_title().to_string(),
            thumbnail: session.thumbnail().to_string(),
            session_date: session.session_date(),
            start_time: session.start_time().to_string(),
            meeting_link: session.meeting_link().to_string(),
            meeting_provider: session.meeting_link().provider(),
            description: session.description().map(str::to_string),
            duration: session.duration_minutes(),
            instructor: session.instructor().to_string(),
            max_participants: session.max_participants(),
            enrolled_participants: session.enrolled_participants().to_vec(),
            enrolled_count: session.enrolled_count(),
            available_spots: session.available_spots(),
            status: derive_status(session, now),
            is_public: session.is_public(),
            full_date_time: session.full_date_time(),
            end_date_time: session.end_date_time(),
            version: session.version(),
            created_at: *session.created_at(),
            updated_at: *session.updated_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::test_support::*;

    // Trait object safety test
    #[test]
    fn session_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn SessionReader) {}
    }

    #[test]
    fn query_offset_follows_page() {
        let mut query = SessionQuery::default();
        assert_eq!(query.offset(), 0);

        query.page = 3;
        query.limit = 25;
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn pagination_rounds_pages_up() {
        let p = Pagination::new(2, 10, 21);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(p.has_prev_page);

        let last = Pagination::new(3, 10, 21);
        assert!(!last.has_next_page);
    }

    #[test]
    fn pagination_of_empty_set() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn sort_field_parses_whitelisted_names_only() {
        assert_eq!("classTitle".parse::<SortField>().unwrap(), SortField::ClassTitle);
        assert!("meetingLink".parse::<SortField>().is_err());
        assert!("class_title; DROP TABLE sessions".parse::<SortField>().is_err());
    }

    #[test]
    fn stats_record_by_status() {
        let mut stats = SessionStats::default();
        stats.record(SessionStatus::Scheduled, 3);
        stats.record(SessionStatus::Cancelled, 1);

        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.scheduled, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.total_enrolled, 4);
    }

    #[test]
    fn view_uses_derived_status_and_camel_case() {
        let session = session_starting("2026-11-02T10:00:00Z", 60, 10);
        let view = SessionView::from_session(&session, at("2026-11-02T10:30:00Z"));

        assert_eq!(session.status(), SessionStatus::Scheduled);
        assert_eq!(view.status, SessionStatus::Ongoing);
        assert_eq!(view.available_spots, 10);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["classTitle"], "Intro to Rust");
        assert_eq!(json["startTime"], "10:00");
        assert_eq!(json["sessionDate"], "2026-11-02");
        assert_eq!(json["meetingProvider"], "zoom");
        assert_eq!(json["status"], "ongoing");
    }
}
