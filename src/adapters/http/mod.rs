//! HTTP adapters - REST API over axum.

pub mod middleware;
pub mod router;
pub mod session;

pub use router::app_router;
pub use session::SessionHandlers;
