//! Session-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, UserId, ValidationErrors};

/// Session-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// One or more fields were rejected.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("User {0} is already enrolled in this session")]
    AlreadyEnrolled(UserId),

    #[error("Session is full")]
    SessionFull,

    #[error("Session has already started")]
    SessionInPast,

    #[error("Session has been cancelled")]
    SessionCancelled,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Versioned write kept losing to concurrent writers.
    #[error("Session {0} was modified concurrently, please retry")]
    Conflict(SessionId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SessionError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidState(message.into())
    }

    /// Any read-side failure is a storage failure.
    pub fn storage(err: DomainError) -> Self {
        SessionError::Storage(err.to_string())
    }

    /// Maps a repository error for the session `id`.
    pub fn from_store(err: DomainError, id: SessionId) -> Self {
        match err.code {
            ErrorCode::SessionNotFound => SessionError::NotFound(id),
            ErrorCode::ConcurrencyConflict => SessionError::Conflict(id),
            ErrorCode::InvalidStateTransition => SessionError::InvalidState(err.message),
            _ => SessionError::Storage(err.to_string()),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::Validation(_) => ErrorCode::ValidationFailed,
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::AlreadyEnrolled(_) => ErrorCode::AlreadyEnrolled,
            SessionError::SessionFull => ErrorCode::SessionFull,
            SessionError::SessionInPast => ErrorCode::SessionInPast,
            SessionError::SessionCancelled => ErrorCode::SessionCancelled,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::Conflict(_) => ErrorCode::ConcurrencyConflict,
            SessionError::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<ValidationErrors> for SessionError {
    fn from(errors: ValidationErrors) -> Self {
        SessionError::Validation(errors)
    }
}
