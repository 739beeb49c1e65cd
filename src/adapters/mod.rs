//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - token validators (JWT, mock)
//! - `http` - axum REST API
//! - `memory` - in-memory session store
//! - `postgres` - sqlx PostgreSQL session store

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
