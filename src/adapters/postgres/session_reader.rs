//! PostgreSQL implementation of SessionReader.
//!
//! Listing and stats run against an `effective` CTE that computes each
//! row's time-derived status from the bound `now`, so filters and counts
//! agree with the status callers see. Reads never write.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::foundation::{DomainError, SessionId, Timestamp};
use crate::ports::{
    Pagination, SessionPage, SessionQuery, SessionReader, SessionStats, SessionView, SortField,
};

use super::session_row::{db_error, SessionRow, SESSION_COLUMNS};

/// PostgreSQL implementation of SessionReader.
#[derive(Clone)]
pub struct PostgresSessionReader {
    pool: PgPool,
}

impl PostgresSessionReader {
    /// Creates a new PostgresSessionReader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_sessions: i64,
    scheduled: i64,
    ongoing: i64,
    completed: i64,
    cancelled: i64,
    total_enrolled: i64,
}

impl From<StatsRow> for SessionStats {
    fn from(row: StatsRow) -> Self {
        Self {
            total_sessions: row.total_sessions.max(0) as u64,
            scheduled: row.scheduled.max(0) as u64,
            ongoing: row.ongoing.max(0) as u64,
            completed: row.completed.max(0) as u64,
            cancelled: row.cancelled.max(0) as u64,
            total_enrolled: row.total_enrolled.max(0) as u64,
        }
    }
}

/// Opens the builder with the `effective` CTE evaluated at `now`.
fn with_effective(now: Timestamp) -> QueryBuilder<'static, Postgres> {
    let now = *now.as_datetime();
    let mut qb = QueryBuilder::new(
        "WITH effective AS (SELECT s.*, jsonb_array_length(s.enrolled_participants) AS enrolled_count, \
         CASE WHEN s.status IN ('scheduled', 'ongoing') AND ",
    );
    qb.push_bind(now);
    qb.push(
        " > s.starts_at + make_interval(mins => s.duration_minutes) THEN 'completed' \
         WHEN s.status = 'scheduled' AND ",
    );
    qb.push_bind(now);
    qb.push(" >= s.starts_at THEN 'ongoing' ELSE s.status END AS effective_status FROM sessions s) ");
    qb
}

/// `%needle%` for ILIKE with the wildcard characters escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, query: &SessionQuery) {
    qb.push(" WHERE TRUE");

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search.trim());
        qb.push(" AND (class_title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR instructor ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(status) = query.status {
        qb.push(" AND effective_status = ");
        qb.push_bind(status.as_str());
    }
    if let Some(is_public) = query.is_public {
        qb.push(" AND is_public = ");
        qb.push_bind(is_public);
    }
    if let Some(instructor) = query.instructor.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND instructor ILIKE ");
        qb.push_bind(like_pattern(instructor.trim()));
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::SessionDate => "starts_at",
        SortField::StartTime => "start_time",
        SortField::ClassTitle => "class_title",
        SortField::Instructor => "instructor",
        SortField::Duration => "duration_minutes",
        SortField::MaxParticipants => "max_participants",
        SortField::Status => "effective_status",
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
    }
}

fn into_views(rows: Vec<SessionRow>, now: Timestamp) -> Result<Vec<SessionView>, DomainError> {
    rows.into_iter()
        .map(|row| {
            row.into_session()
                .map(|session| SessionView::from_session(&session, now))
        })
        .collect()
}

#[async_trait]
impl SessionReader for PostgresSessionReader {
    async fn get_by_id(
        &self,
        id: &SessionId,
        now: Timestamp,
    ) -> Result<Option<SessionView>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch session"))?;

        row.map(|row| {
            row.into_session()
                .map(|session| SessionView::from_session(&session, now))
        })
        .transpose()
    }

    async fn list(&self, query: &SessionQuery, now: Timestamp) -> Result<SessionPage, DomainError> {
        let mut stats_qb = with_effective(now);
        stats_qb.push(
            "SELECT COUNT(*) AS total_sessions, \
             COUNT(*) FILTER (WHERE effective_status = 'scheduled') AS scheduled, \
             COUNT(*) FILTER (WHERE effective_status = 'ongoing') AS ongoing, \
             COUNT(*) FILTER (WHERE effective_status = 'completed') AS completed, \
             COUNT(*) FILTER (WHERE effective_status = 'cancelled') AS cancelled, \
             COALESCE(SUM(enrolled_count), 0)::BIGINT AS total_enrolled \
             FROM effective",
        );
        push_filters(&mut stats_qb, query);

        let stats: SessionStats = stats_qb
            .build_query_as::<StatsRow>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count sessions"))?
            .into();

        let mut page_qb = with_effective(now);
        page_qb.push(format!("SELECT {} FROM effective", SESSION_COLUMNS));
        push_filters(&mut page_qb, query);
        page_qb.push(format!(
            " ORDER BY {} {}, id ASC LIMIT ",
            sort_column(query.sort_by),
            query.sort_order
        ));
        page_qb.push_bind(i64::from(query.limit));
        page_qb.push(" OFFSET ");
        page_qb.push_bind(query.offset() as i64);

        let rows: Vec<SessionRow> = page_qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list sessions"))?;

        Ok(SessionPage {
            sessions: into_views(rows, now)?,
            pagination: Pagination::new(query.page, query.limit, stats.total_sessions),
            stats,
        })
    }

    async fn list_upcoming(
        &self,
        limit: u32,
        now: Timestamp,
    ) -> Result<Vec<SessionView>, DomainError> {
        let mut qb = with_effective(now);
        qb.push(format!(
            "SELECT {} FROM effective WHERE is_public AND effective_status = 'scheduled' AND starts_at > ",
            SESSION_COLUMNS
        ));
        qb.push_bind(*now.as_datetime());
        qb.push(" ORDER BY starts_at ASC, id ASC LIMIT ");
        qb.push_bind(i64::from(limit));

        let rows: Vec<SessionRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list upcoming sessions"))?;

        into_views(rows, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionStatus;
    use crate::ports::SortOrder;

    fn now() -> Timestamp {
        Timestamp::now()
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }

    #[test]
    fn filters_bind_every_user_value() {
        let query = SessionQuery {
            search: Some("rust'; --".to_string()),
            status: Some(SessionStatus::Scheduled),
            is_public: Some(true),
            instructor: Some("Ann".to_string()),
            ..Default::default()
        };
        let mut qb = with_effective(now());
        qb.push("SELECT id FROM effective");
        push_filters(&mut qb, &query);
        let sql = qb.sql().to_string();

        assert!(!sql.contains("rust'"));
        assert!(!sql.contains("Ann"));
        assert!(sql.contains("effective_status = $"));
        assert!(sql.contains("instructor ILIKE $"));
        assert!(sql.contains("is_public = $"));
    }

    #[test]
    fn blank_filters_are_skipped() {
        let query = SessionQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let mut qb = with_effective(now());
        qb.push("SELECT id FROM effective");
        push_filters(&mut qb, &query);
        assert!(!qb.sql().contains("ILIKE"));
    }

    #[test]
    fn sort_columns_are_whitelisted() {
        assert_eq!(sort_column(SortField::SessionDate), "starts_at");
        assert_eq!(sort_column(SortField::Status), "effective_status");
        assert_eq!(SortOrder::Desc.to_string(), "DESC");
    }
}
