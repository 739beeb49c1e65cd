//! HTTP DTOs for session endpoints.
//!
//! Bodies are camelCase and wrapped in a `{ success, message, data }`
//! envelope, the shape the platform's web clients already consume.

use serde::{Deserialize, Serialize};

use crate::application::handlers::session::ListSessionsQuery;
use crate::domain::foundation::{
    FieldViolation, SessionStatus, ValidationError, ValidationErrors,
};
use crate::domain::session::{SessionDraft, SessionPatch};
use crate::ports::{SessionView, SortField, SortOrder};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/sessions`. Missing fields are reported by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub class_title: Option<String>,
    pub thumbnail: Option<String>,
    pub session_date: Option<String>,
    pub start_time: Option<String>,
    pub meeting_link: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub instructor: Option<String>,
    pub max_participants: Option<i64>,
    pub is_public: Option<bool>,
}

impl From<CreateSessionRequest> for SessionDraft {
    fn from(req: CreateSessionRequest) -> Self {
        Self {
            class_title: req.class_title,
            thumbnail: req.thumbnail,
            session_date: req.session_date,
            start_time: req.start_time,
            meeting_link: req.meeting_link,
            description: req.description,
            duration: req.duration,
            instructor: req.instructor,
            max_participants: req.max_participants,
            is_public: req.is_public,
        }
    }
}

/// Body of `PUT /api/sessions/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub class_title: Option<String>,
    pub thumbnail: Option<String>,
    pub session_date: Option<String>,
    pub start_time: Option<String>,
    pub meeting_link: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub instructor: Option<String>,
    pub max_participants: Option<i64>,
    pub is_public: Option<bool>,
    pub status: Option<String>,
}

impl From<UpdateSessionRequest> for SessionPatch {
    fn from(req: UpdateSessionRequest) -> Self {
        Self {
            class_title: req.class_title,
            thumbnail: req.thumbnail,
            session_date: req.session_date,
            start_time: req.start_time,
            meeting_link: req.meeting_link,
            description: req.description,
            duration: req.duration,
            instructor: req.instructor,
            max_participants: req.max_participants,
            is_public: req.is_public,
            status: req.status,
        }
    }
}

/// Query string of `GET /api/sessions`, kept raw so bad values become
/// field violations rather than extractor rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub is_public: Option<String>,
    pub instructor: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListSessionsParams {
    pub fn into_query(self) -> Result<ListSessionsQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let status = errors.check(parse_opt(self.status.as_deref(), |s| s.parse::<SessionStatus>()));
        let is_public = errors.check(parse_opt(self.is_public.as_deref(), |s| {
            s.parse::<bool>()
                .map_err(|_| ValidationError::invalid_format("isPublic", "expected true or false"))
        }));
        let page = errors.check(parse_opt(self.page.as_deref(), |s| positive("page", s)));
        let limit = errors.check(parse_opt(self.limit.as_deref(), |s| positive("limit", s)));
        let sort_by = errors.check(parse_opt(self.sort_by.as_deref(), |s| {
            s.parse::<SortField>()
                .map_err(|reason| ValidationError::invalid_format("sortBy", reason))
        }));
        let sort_order = errors.check(parse_opt(self.sort_order.as_deref(), |s| {
            s.parse::<SortOrder>()
                .map_err(|reason| ValidationError::invalid_format("sortOrder", reason))
        }));

        errors.into_result()?;

        Ok(ListSessionsQuery {
            search: self.search,
            status: status.flatten(),
            is_public: is_public.flatten(),
            instructor: self.instructor,
            page: page.flatten(),
            limit: limit.flatten(),
            sort_by: sort_by.flatten(),
            sort_order: sort_order.flatten(),
        })
    }
}

/// Query string of `GET /api/sessions/upcoming`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcomingParams {
    pub limit: Option<String>,
}

impl UpcomingParams {
    pub fn limit(&self) -> Result<Option<u32>, ValidationErrors> {
        parse_opt(self.limit.as_deref(), |s| positive("limit", s)).map_err(Into::into)
    }
}

/// Blank values count as absent.
fn parse_opt<T>(
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, ValidationError>,
) -> Result<Option<T>, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse(s).map(Some),
        None => Ok(None),
    }
}

fn positive(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    raw.parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| ValidationError::invalid_format(field, "expected a positive integer"))
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Result of a withdraw call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub withdrawn: bool,
    pub session: SessionView,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            details: Some(errors.violations()),
            ..Self::new("VALIDATION_FAILED", "Validation failed")
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reads_camel_case() {
        let json = r#"{
            "classTitle": "Intro to Rust",
            "sessionDate": "2026-11-02",
            "startTime": "9:30",
            "meetingLink": "https://zoom.us/j/12345",
            "maxParticipants": 20,
            "isPublic": false
        }"#;
        let draft: SessionDraft = serde_json::from_str::<CreateSessionRequest>(json)
            .unwrap()
            .into();

        assert_eq!(draft.class_title.as_deref(), Some("Intro to Rust"));
        assert_eq!(draft.start_time.as_deref(), Some("9:30"));
        assert_eq!(draft.max_participants, Some(20));
        assert_eq!(draft.is_public, Some(false));
        assert!(draft.instructor.is_none());
    }

    #[test]
    fn update_request_keeps_absent_fields_unset() {
        let patch: SessionPatch =
            serde_json::from_str::<UpdateSessionRequest>(r#"{"status":"cancelled"}"#)
                .unwrap()
                .into();

        assert_eq!(patch.status.as_deref(), Some("cancelled"));
        assert!(patch.class_title.is_none());
    }

    #[test]
    fn list_params_parse_into_typed_query() {
        let params = ListSessionsParams {
            status: Some("Scheduled".to_string()),
            is_public: Some("true".to_string()),
            page: Some("2".to_string()),
            limit: Some("5".to_string()),
            sort_by: Some("classTitle".to_string()),
            sort_order: Some("desc".to_string()),
            ..Default::default()
        };

        let query = params.into_query().unwrap();
        assert_eq!(query.status, Some(SessionStatus::Scheduled));
        assert_eq!(query.is_public, Some(true));
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.sort_by, Some(SortField::ClassTitle));
        assert_eq!(query.sort_order, Some(SortOrder::Desc));
    }

    #[test]
    fn list_params_report_every_bad_value() {
        let params = ListSessionsParams {
            status: Some("active".to_string()),
            page: Some("0".to_string()),
            sort_by: Some("password".to_string()),
            ..Default::default()
        };

        let errors = params.into_query().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("status"));
        assert!(errors.has_field("page"));
        assert!(errors.has_field("sortBy"));
    }

    #[test]
    fn blank_params_are_absent() {
        let params = ListSessionsParams {
            page: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.into_query().unwrap().page, None);
    }

    #[test]
    fn validation_error_response_lists_details() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::invalid_meeting_link("meetingLink"));
        let body = serde_json::to_value(ErrorResponse::validation(&errors)).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["details"][0]["field"], "meetingLink");
        assert_eq!(body["details"][0]["kind"], "INVALID_MEETING_LINK");
    }
}
