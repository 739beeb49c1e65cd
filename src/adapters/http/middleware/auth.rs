//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` - validates Bearer tokens and injects the user into extensions
//! - `RequireAuth` - extractor that requires an authenticated caller
//! - `RequireStaff` - extractor that additionally requires an admin or instructor
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth / RequireStaff read from extensions
//! ```
//!
//! The middleware only depends on the `TokenValidator` port, so JWT in
//! production and the mock in tests plug in the same way.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::TokenValidator;

/// Auth middleware state - wraps the token validator.
pub type AuthState = Arc<dyn TokenValidator>;

/// Validates `Authorization: Bearer <token>` when present.
///
/// Requests without a token pass through unauthenticated so that public
/// routes keep working; `RequireAuth` rejects them later. A token that is
/// present but invalid is answered with 401 right here.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!("Auth service unavailable: {}", msg);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Authentication service unavailable",
                    )
                }
                AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Forbidden"),
            };
            tracing::warn!(error = %e, "Rejected bearer token");

            (
                status,
                Json(serde_json::json!({
                    "success": false,
                    "code": "AUTH_ERROR",
                    "message": message,
                })),
            )
                .into_response()
        }
    }
}

/// Extractor that requires authentication.
///
/// ```ignore
/// async fn enroll(RequireAuth(user): RequireAuth) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor for session management: admin or instructor only.
#[derive(Debug, Clone)]
pub struct RequireStaff(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_staff() {
            tracing::warn!(user_id = %user.id, role = %user.role, "Staff-only route refused");
            return Err(AuthRejection::Forbidden);
        }
        Ok(RequireStaff(user))
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
    /// Authenticated, but the role may not perform the operation.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required",
            ),
            AuthRejection::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Only admins and instructors can manage sessions",
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "success": false,
                "code": code,
                "message": message,
            })),
        )
            .into_response()
    }
}
