//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ApiResponse, CreateSessionRequest, ErrorResponse, ListSessionsParams, UpcomingParams,
    UpdateSessionRequest, WithdrawResponse,
};
pub use handlers::SessionHandlers;
pub use routes::session_routes;
