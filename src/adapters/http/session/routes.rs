//! HTTP routes for session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_session, create_session, delete_session, enroll, get_session, list_sessions,
    list_upcoming, update_session, withdraw, SessionHandlers,
};

/// Session routes, to be nested under `/api/sessions`.
pub fn session_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/", post(create_session).get(list_sessions))
        .route("/upcoming", get(list_upcoming))
        .route(
            "/:id",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/:id/enroll", post(enroll))
        .route("/:id/withdraw", post(withdraw))
        .route("/:id/cancel", post(cancel_session))
        .with_state(handlers)
}
