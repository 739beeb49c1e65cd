//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `session` - Live class sessions: scheduling, status, and enrollment

pub mod foundation;
pub mod session;
