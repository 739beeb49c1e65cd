//! Session module - live class scheduling and enrollment.
//!
//! - `aggregate` - the `Session` entity and its derived values
//! - `schedule` - start time, meeting link, and schedule validation
//! - `draft` - validated construction and partial updates
//! - `lifecycle` - time-derived status, enrollment, cancellation

mod aggregate;
mod draft;
mod errors;
mod lifecycle;
mod schedule;

pub use aggregate::{
    Participant, Session, SessionParts, DEFAULT_DURATION_MINUTES, DEFAULT_MAX_PARTICIPANTS,
    MAX_DESCRIPTION_LENGTH, MAX_DURATION_MINUTES, MAX_INSTRUCTOR_LENGTH, MAX_PARTICIPANTS,
    MAX_TITLE_LENGTH, MIN_DURATION_MINUTES, MIN_PARTICIPANTS,
};
pub use draft::{SessionDraft, SessionPatch};
pub use errors::SessionError;
pub use lifecycle::derive_status;
pub use schedule::{
    parse_session_date, validate_schedule, CheckedSchedule, MeetingLink, MeetingProvider,
    ScheduleInput, ScheduleMode, StartTime,
};

#[cfg(test)]
pub(crate) use aggregate::test_support;
