//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSessionRepository` - versioned session persistence
//! - `PostgresSessionReader` - time-aware session queries

mod session_reader;
mod session_repository;
mod session_row;

pub use session_reader::PostgresSessionReader;
pub use session_repository::PostgresSessionRepository;

/// Embedded migrations from `migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
