//! HTTP handlers for session endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::{RequireAuth, RequireStaff};
use crate::application::handlers::session::{
    CancelSessionCommand, CancelSessionHandler, CreateSessionCommand, CreateSessionHandler,
    DeleteSessionCommand, DeleteSessionHandler, EnrollCommand, EnrollHandler, GetSessionHandler,
    GetSessionQuery, ListSessionsHandler, ListUpcomingSessionsHandler, ListUpcomingSessionsQuery,
    UpdateSessionCommand, UpdateSessionHandler, WithdrawCommand, WithdrawHandler,
};
use crate::config::SessionsConfig;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::{Session, SessionError};
use crate::ports::{SessionReader, SessionRepository, SessionView};

use super::dto::{
    ApiResponse, CreateSessionRequest, ErrorResponse, ListSessionsParams, UpcomingParams,
    UpdateSessionRequest, WithdrawResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionHandlers {
    pub create_handler: Arc<CreateSessionHandler>,
    pub get_handler: Arc<GetSessionHandler>,
    pub list_handler: Arc<ListSessionsHandler>,
    pub upcoming_handler: Arc<ListUpcomingSessionsHandler>,
    pub update_handler: Arc<UpdateSessionHandler>,
    pub delete_handler: Arc<DeleteSessionHandler>,
    pub enroll_handler: Arc<EnrollHandler>,
    pub withdraw_handler: Arc<WithdrawHandler>,
    pub cancel_handler: Arc<CancelSessionHandler>,
}

impl SessionHandlers {
    /// Wires every handler onto the given ports.
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        reader: Arc<dyn SessionReader>,
        config: &SessionsConfig,
    ) -> Self {
        let attempts = config.enroll_max_attempts;
        Self {
            create_handler: Arc::new(CreateSessionHandler::new(repository.clone())),
            get_handler: Arc::new(GetSessionHandler::new(reader.clone())),
            list_handler: Arc::new(ListSessionsHandler::new(reader.clone(), config.clone())),
            upcoming_handler: Arc::new(ListUpcomingSessionsHandler::new(reader, config.clone())),
            update_handler: Arc::new(UpdateSessionHandler::new(repository.clone(), attempts)),
            delete_handler: Arc::new(DeleteSessionHandler::new(repository.clone())),
            enroll_handler: Arc::new(EnrollHandler::new(repository.clone(), attempts)),
            withdraw_handler: Arc::new(WithdrawHandler::new(repository.clone(), attempts)),
            cancel_handler: Arc::new(CancelSessionHandler::new(repository, attempts)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Schedule a new session
pub async fn create_session(
    State(handlers): State<SessionHandlers>,
    RequireStaff(user): RequireStaff,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };

    let cmd = CreateSessionCommand {
        draft: req.into(),
        created_by: user.id,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(ApiResponse::ok("Session created successfully", view(&session))),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// GET /api/sessions - Filtered, paginated listing
pub async fn list_sessions(
    State(handlers): State<SessionHandlers>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<ListSessionsParams>,
) -> Response {
    let query = match params.into_query() {
        Ok(query) => query,
        Err(errors) => return handle_session_error(SessionError::Validation(errors)),
    };

    match handlers.list_handler.handle(query).await {
        Ok(page) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Sessions retrieved successfully", page)),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// GET /api/sessions/upcoming - Public sessions that have not started
pub async fn list_upcoming(
    State(handlers): State<SessionHandlers>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<UpcomingParams>,
) -> Response {
    let limit = match params.limit() {
        Ok(limit) => limit,
        Err(errors) => return handle_session_error(SessionError::Validation(errors)),
    };

    match handlers
        .upcoming_handler
        .handle(ListUpcomingSessionsQuery { limit })
        .await
    {
        Ok(sessions) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Upcoming sessions retrieved successfully", sessions)),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// GET /api/sessions/:id - Session details
pub async fn get_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(_user): RequireAuth,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.get_handler.handle(GetSessionQuery { session_id }).await {
        Ok(view) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Session retrieved successfully", view)),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// PUT /api/sessions/:id - Partial administrative update
pub async fn update_session(
    State(handlers): State<SessionHandlers>,
    RequireStaff(user): RequireStaff,
    Path(session_id): Path<String>,
    body: Result<Json<UpdateSessionRequest>, JsonRejection>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };

    let cmd = UpdateSessionCommand {
        session_id,
        patch: req.into(),
        updated_by: user.id,
    };

    match handlers.update_handler.handle(cmd).await {
        Ok(session) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Session updated successfully", view(&session))),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// DELETE /api/sessions/:id - Remove a session
pub async fn delete_session(
    State(handlers): State<SessionHandlers>,
    RequireStaff(user): RequireStaff,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = DeleteSessionCommand {
        session_id,
        deleted_by: user.id,
    };

    match handlers.delete_handler.handle(cmd).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(
                "Session deleted successfully",
                serde_json::json!({ "id": session_id }),
            )),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/enroll - Enroll the caller
pub async fn enroll(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = EnrollCommand {
        session_id,
        user_id: user.id,
    };

    match handlers.enroll_handler.handle(cmd).await {
        Ok(session) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Enrolled successfully", view(&session))),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/withdraw - Withdraw the caller
pub async fn withdraw(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = WithdrawCommand {
        session_id,
        user_id: user.id,
    };

    match handlers.withdraw_handler.handle(cmd).await {
        Ok(result) => {
            let message = if result.withdrawn {
                "Withdrawn successfully"
            } else {
                "Not enrolled in this session"
            };
            let body = WithdrawResponse {
                withdrawn: result.withdrawn,
                session: view(&result.session),
            };
            (StatusCode::OK, Json(ApiResponse::ok(message, body))).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/cancel - Cancel a session
pub async fn cancel_session(
    State(handlers): State<SessionHandlers>,
    RequireStaff(user): RequireStaff,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = CancelSessionCommand {
        session_id,
        cancelled_by: user.id,
    };

    match handlers.cancel_handler.handle(cmd).await {
        Ok(session) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Session cancelled successfully", view(&session))),
        )
            .into_response(),
        Err(e) => handle_session_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn view(session: &Session) -> SessionView {
    SessionView::from_session(session, Timestamp::now())
}

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

/// Unreadable bodies keep axum's status but use the error envelope.
fn rejected_body(rejection: JsonRejection) -> Response {
    tracing::debug!(error = %rejection, "Rejected request body");
    (
        rejection.status(),
        Json(ErrorResponse::new("INVALID_BODY", rejection.body_text())),
    )
        .into_response()
}

fn handle_session_error(error: SessionError) -> Response {
    let code = error.code().to_string();
    let message = error.to_string();
    match error {
        SessionError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(&errors)),
        )
            .into_response(),
        SessionError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Session", &id.to_string())),
        )
            .into_response(),
        SessionError::InvalidState(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(code, msg)),
        )
            .into_response(),
        SessionError::AlreadyEnrolled(_)
        | SessionError::SessionFull
        | SessionError::SessionInPast
        | SessionError::SessionCancelled
        | SessionError::Conflict(_) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(code, message)),
        )
            .into_response(),
        SessionError::Storage(msg) => {
            tracing::error!(error = %msg, "Session storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Internal server error")),
            )
                .into_response()
        }
    }
}
