//! Session repository port (write side).
//!
//! Defines the contract for persisting and retrieving Session aggregates.
//!
//! # Concurrency
//!
//! `update` is a versioned compare-and-set: it succeeds only while the
//! stored version equals `session.version()` and bumps the stored version
//! by one. Callers that lose the race get `ConcurrencyConflict`, reload,
//! and re-run their checks against the fresh state.

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::session::Session;
use async_trait::async_trait;

/// Repository port for Session aggregate persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &Session) -> Result<(), DomainError>;

    /// Update an existing session if nobody else wrote it since it was loaded.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `ConcurrencyConflict` if the stored version moved on
    /// - `DatabaseError` on persistence failure
    async fn update(&self, session: &Session) -> Result<(), DomainError>;

    /// Find a session by its ID, as stored.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Delete a session.
    ///
    /// Enrollments go with it; nothing outside the session row is touched.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn delete(&self, id: &SessionId) -> Result<(), DomainError>;
}
