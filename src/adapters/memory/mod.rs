//! In-memory adapters.
//!
//! Back the tests and embedders that do not want a database. They keep the
//! same versioned-write semantics as the PostgreSQL adapters.

mod session_store;

pub use session_store::InMemorySessionStore;
