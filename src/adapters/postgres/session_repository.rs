//! PostgreSQL implementation of SessionRepository.
//!
//! Persists Session aggregates to the `sessions` table. Updates use
//! optimistic locking on the `version` column.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

use super::session_row::{db_error, SessionRow, SESSION_COLUMNS};

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sessions WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check session existence"))
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, class_title, thumbnail, session_date, start_time, starts_at,
                meeting_link, description, duration_minutes, instructor,
                max_participants, enrolled_participants, status, is_public,
                version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.class_title())
        .bind(session.thumbnail())
        .bind(session.session_date())
        .bind(session.start_time().to_string())
        .bind(session.full_date_time().as_datetime())
        .bind(session.meeting_link().as_str())
        .bind(session.description())
        .bind(session.duration_minutes())
        .bind(session.instructor())
        .bind(session.max_participants())
        .bind(Json(session.enrolled_participants()))
        .bind(session.status().as_str())
        .bind(session.is_public())
        .bind(session.version())
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert session"))?;

        tracing::debug!(session_id = %session.id(), "session inserted");
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                class_title = $2,
                thumbnail = $3,
                session_date = $4,
                start_time = $5,
                starts_at = $6,
                meeting_link = $7,
                description = $8,
                duration_minutes = $9,
                instructor = $10,
                max_participants = $11,
                enrolled_participants = $12,
                status = $13,
                is_public = $14,
                updated_at = $15,
                version = version + 1
            WHERE id = $1 AND version = $16
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.class_title())
        .bind(session.thumbnail())
        .bind(session.session_date())
        .bind(session.start_time().to_string())
        .bind(session.full_date_time().as_datetime())
        .bind(session.meeting_link().as_str())
        .bind(session.description())
        .bind(session.duration_minutes())
        .bind(session.instructor())
        .bind(session.max_participants())
        .bind(Json(session.enrolled_participants()))
        .bind(session.status().as_str())
        .bind(session.is_public())
        .bind(session.updated_at().as_datetime())
        .bind(session.version())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update session"))?;

        if result.rows_affected() == 0 {
            return if self.exists(session.id()).await? {
                Err(DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    "Session version mismatch - another update occurred",
                ))
            } else {
                Err(DomainError::new(
                    ErrorCode::SessionNotFound,
                    format!("Session not found: {}", session.id()),
                ))
            };
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch session"))?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete session"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", id),
            ));
        }

        Ok(())
    }
}
