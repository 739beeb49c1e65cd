//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the live class domain.

mod auth;
mod errors;
mod ids;
mod session_status;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser, UserRole};
pub use errors::{DomainError, ErrorCode, FieldViolation, ValidationError, ValidationErrors};
pub use ids::{SessionId, UserId};
pub use session_status::SessionStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
