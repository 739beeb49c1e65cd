//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionRepository` - versioned session persistence (write side)
//! - `SessionReader` - time-aware session queries (read side)
//! - `TokenValidator` - bearer token verification

mod session_reader;
mod session_repository;
mod token_validator;

pub use session_reader::{
    Pagination, SessionPage, SessionQuery, SessionReader, SessionStats, SessionView, SortField,
    SortOrder,
};
pub use session_repository::SessionRepository;
pub use token_validator::TokenValidator;
