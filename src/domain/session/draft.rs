//! Construction and administrative update of sessions.
//!
//! Both paths take raw, optional caller input and validate every field
//! before anything is applied, so one response can list all problems.

use crate::domain::foundation::{
    SessionId, SessionStatus, Timestamp, ValidationError, ValidationErrors,
};

use super::aggregate::{
    Session, DEFAULT_DURATION_MINUTES, DEFAULT_MAX_PARTICIPANTS, MAX_DESCRIPTION_LENGTH,
    MAX_DURATION_MINUTES, MAX_INSTRUCTOR_LENGTH, MAX_PARTICIPANTS, MAX_TITLE_LENGTH,
    MIN_DURATION_MINUTES, MIN_PARTICIPANTS,
};
use super::errors::SessionError;
use super::schedule::{validate_schedule, CheckedSchedule, ScheduleInput, ScheduleMode};

/// Caller input for a new session.
#[derive(Debug, Clone, Default)]
pub struct SessionDraft {
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

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub class_title: Option<String>,
    pub thumbnail: Option<String>,
    pub session_date: Option<String>,
    pub start_time: Option<String>,
    pub meeting_link: Option<String>,
    /// An empty string clears the description.
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub instructor: Option<String>,
    pub max_participants: Option<i64>,
    pub is_public: Option<bool>,
    /// Only `cancelled` is accepted; the other statuses are time-derived.
    pub status: Option<String>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.class_title.is_none()
            && self.thumbnail.is_none()
            && self.session_date.is_none()
            && self.start_time.is_none()
            && self.meeting_link.is_none()
            && self.description.is_none()
            && self.duration.is_none()
            && self.instructor.is_none()
            && self.max_participants.is_none()
            && self.is_public.is_none()
            && self.status.is_none()
    }
}

fn required_text(
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Result<String, ValidationError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    match max {
        Some(max) if trimmed.chars().count() > max => Err(ValidationError::too_long(field, max)),
        _ => Ok(trimmed.to_string()),
    }
}

fn description_text(value: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::too_long("description", MAX_DESCRIPTION_LENGTH));
    }
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn bounded(field: &str, value: i64, min: i32, max: i32) -> Result<i32, ValidationError> {
    if value < i64::from(min) || value > i64::from(max) {
        return Err(ValidationError::out_of_range(
            field,
            i64::from(min),
            i64::from(max),
            value,
        ));
    }
    // range checked above
    Ok(value as i32)
}

impl Session {
    /// Validates a draft and builds a scheduled session at version 1.
    ///
    /// # Errors
    ///
    /// - `Validation` listing every rejected field
    pub fn create(id: SessionId, draft: SessionDraft, now: Timestamp) -> Result<Self, SessionError> {
        let mut errors = ValidationErrors::new();

        let class_title = errors.check(required_text(
            "classTitle",
            draft.class_title.as_deref(),
            Some(MAX_TITLE_LENGTH),
        ));
        let thumbnail = errors.check(required_text("thumbnail", draft.thumbnail.as_deref(), None));
        let instructor = errors.check(required_text(
            "instructor",
            draft.instructor.as_deref(),
            Some(MAX_INSTRUCTOR_LENGTH),
        ));
        let description = match draft.description.as_deref() {
            Some(raw) => errors.check(description_text(raw)).flatten(),
            None => None,
        };
        let duration = errors.check(bounded(
            "duration",
            draft.duration.unwrap_or(i64::from(DEFAULT_DURATION_MINUTES)),
            MIN_DURATION_MINUTES,
            MAX_DURATION_MINUTES,
        ));
        let max_participants = errors.check(bounded(
            "maxParticipants",
            draft
                .max_participants
                .unwrap_or(i64::from(DEFAULT_MAX_PARTICIPANTS)),
            MIN_PARTICIPANTS,
            MAX_PARTICIPANTS,
        ));

        let schedule = match validate_schedule(
            ScheduleInput {
                session_date: draft.session_date.as_deref(),
                start_time: draft.start_time.as_deref(),
                meeting_link: draft.meeting_link.as_deref(),
            },
            now,
            ScheduleMode::Create,
        ) {
            Ok(checked) => Some(checked),
            Err(schedule_errors) => {
                errors.extend(schedule_errors);
                None
            }
        };

        let (
            Some(class_title),
            Some(thumbnail),
            Some(instructor),
            Some(duration_minutes),
            Some(max_participants),
            Some(CheckedSchedule {
                session_date: Some(session_date),
                start_time: Some(start_time),
                meeting_link: Some(meeting_link),
            }),
        ) = (
            class_title,
            thumbnail,
            instructor,
            duration,
            max_participants,
            schedule,
        )
        else {
            return Err(SessionError::Validation(errors));
        };
        errors.into_result()?;

        let mut session = Session {
            id,
            class_title,
            thumbnail,
            session_date,
            start_time,
            meeting_link,
            description,
            duration_minutes,
            instructor,
            max_participants,
            enrolled_participants: Vec::new(),
            status: SessionStatus::Scheduled,
            is_public: draft.is_public.unwrap_or(true),
            version: 1,
            created_at: now,
            updated_at: now,
        };
        session.refresh_status(now);
        Ok(session)
    }

    /// Applies an administrative update, re-validating only supplied fields.
    ///
    /// Nothing is applied unless every supplied field is valid. Returns
    /// whether the session changed.
    ///
    /// # Errors
    ///
    /// - `Validation` listing every rejected field
    /// - `InvalidState` when cancelling a completed session
    pub fn apply_patch(&mut self, patch: SessionPatch, now: Timestamp) -> Result<bool, SessionError> {
        let mut errors = ValidationErrors::new();
        let mut next = self.clone();

        if let Some(raw) = patch.class_title.as_deref() {
            if let Some(title) =
                errors.check(required_text("classTitle", Some(raw), Some(MAX_TITLE_LENGTH)))
            {
                next.class_title = title;
            }
        }
        if let Some(raw) = patch.thumbnail.as_deref() {
            if let Some(thumbnail) = errors.check(required_text("thumbnail", Some(raw), None)) {
                next.thumbnail = thumbnail;
            }
        }
        if let Some(raw) = patch.instructor.as_deref() {
            if let Some(instructor) = errors.check(required_text(
                "instructor",
                Some(raw),
                Some(MAX_INSTRUCTOR_LENGTH),
            )) {
                next.instructor = instructor;
            }
        }
        if let Some(raw) = patch.description.as_deref() {
            if let Some(description) = errors.check(description_text(raw)) {
                next.description = description;
            }
        }
        if let Some(raw) = patch.duration {
            if let Some(duration) = errors.check(bounded(
                "duration",
                raw,
                MIN_DURATION_MINUTES,
                MAX_DURATION_MINUTES,
            )) {
                next.duration_minutes = duration;
            }
        }
        if let Some(raw) = patch.max_participants {
            if let Some(capacity) =
                errors.check(bounded("maxParticipants", raw, MIN_PARTICIPANTS, MAX_PARTICIPANTS))
            {
                let enrolled = self.enrolled_count();
                if capacity < enrolled {
                    errors.push(ValidationError::out_of_range(
                        "maxParticipants",
                        i64::from(enrolled),
                        i64::from(MAX_PARTICIPANTS),
                        raw,
                    ));
                } else {
                    next.max_participants = capacity;
                }
            }
        }
        if let Some(is_public) = patch.is_public {
            next.is_public = is_public;
        }

        match validate_schedule(
            ScheduleInput {
                session_date: patch.session_date.as_deref(),
                start_time: patch.start_time.as_deref(),
                meeting_link: patch.meeting_link.as_deref(),
            },
            now,
            ScheduleMode::Update,
        ) {
            Ok(checked) => {
                if let Some(date) = checked.session_date {
                    next.session_date = date;
                }
                if let Some(time) = checked.start_time {
                    next.start_time = time;
                }
                if let Some(link) = checked.meeting_link {
                    next.meeting_link = link;
                }
            }
            Err(schedule_errors) => errors.extend(schedule_errors),
        }

        let wants_cancel = match patch.status.as_deref() {
            None => false,
            Some(raw) => match errors.check(raw.parse::<SessionStatus>()) {
                Some(SessionStatus::Cancelled) => true,
                Some(_) => {
                    errors.push(ValidationError::invalid_format(
                        "status",
                        "only 'cancelled' can be set explicitly",
                    ));
                    false
                }
                None => false,
            },
        };

        errors.into_result()?;

        if next != *self {
            next.updated_at = now;
        }
        if wants_cancel && next.status != SessionStatus::Cancelled {
            next.cancel(now)?;
        } else {
            next.refresh_status(now);
        }

        let changed = next != *self;
        *self = next;
        Ok(changed)
    }
}
