//! Scheduling value objects and schedule validation.
//!
//! A session's schedule is its calendar date, a wall-clock start time, and
//! the link to the externally hosted meeting. All three are validated
//! together so a caller sees every problem at once.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError, ValidationErrors};

static START_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-1]?[0-9]|2[0-3]):([0-5][0-9])$").expect("valid start time regex")
});

static ZOOM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://[A-Za-z0-9_-]*\.?zoom\.us/(j|my)/[A-Za-z0-9_?=-]+")
        .expect("valid zoom regex")
});

static MEET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://meet\.google\.com/[A-Za-z0-9_-]+").expect("valid meet regex")
});

/// Wall-clock start time, 24-hour, stored as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StartTime(NaiveTime);

impl StartTime {
    /// Parses `H:MM` or `HH:MM`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let caps = START_TIME_PATTERN
            .captures(raw.trim())
            .ok_or_else(|| ValidationError::invalid_time_format("startTime"))?;

        let hour: u32 = caps[1]
            .parse()
            .map_err(|_| ValidationError::invalid_time_format("startTime"))?;
        let minute: u32 = caps[2]
            .parse()
            .map_err(|_| ValidationError::invalid_time_format("startTime"))?;

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| ValidationError::invalid_time_format("startTime"))
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl TryFrom<String> for StartTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StartTime> for String {
    fn from(time: StartTime) -> Self {
        time.to_string()
    }
}

/// Hosting service recognised from a meeting link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingProvider {
    Zoom,
    GoogleMeet,
}

/// Link to an externally hosted Zoom or Google Meet meeting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeetingLink(String);

impl MeetingLink {
    /// Trims and matches against the accepted provider patterns.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let link = raw.trim();
        if link.is_empty() {
            return Err(ValidationError::required("meetingLink"));
        }
        if provider_of(link).is_none() {
            return Err(ValidationError::invalid_meeting_link("meetingLink"));
        }
        Ok(Self(link.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn provider(&self) -> MeetingProvider {
        // parse() guarantees one of the patterns matched
        provider_of(&self.0).unwrap_or(MeetingProvider::Zoom)
    }
}

fn provider_of(link: &str) -> Option<MeetingProvider> {
    if ZOOM_PATTERN.is_match(link) {
        Some(MeetingProvider::Zoom)
    } else if MEET_PATTERN.is_match(link) {
        Some(MeetingProvider::GoogleMeet)
    } else {
        None
    }
}

impl fmt::Display for MeetingLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MeetingLink {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MeetingLink> for String {
    fn from(link: MeetingLink) -> Self {
        link.0
    }
}

/// Parses a session date given as `YYYY-MM-DD` or as an RFC 3339 instant.
///
/// Instants contribute their UTC calendar date.
pub fn parse_session_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::required("sessionDate"));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| {
            ValidationError::invalid_format("sessionDate", "expected YYYY-MM-DD or an RFC 3339 date")
        })
}

/// Which checks `validate_schedule` applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Every field required; the combined start must lie strictly in the future.
    Create,
    /// Only supplied fields are checked; the date gets the date-only floor.
    Update,
}

/// Raw schedule fields as received from a caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleInput<'a> {
    pub session_date: Option<&'a str>,
    pub start_time: Option<&'a str>,
    pub meeting_link: Option<&'a str>,
}

/// Schedule fields that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckedSchedule {
    pub session_date: Option<NaiveDate>,
    pub start_time: Option<StartTime>,
    pub meeting_link: Option<MeetingLink>,
}

/// Validates a schedule, reporting every violation together.
pub fn validate_schedule(
    input: ScheduleInput<'_>,
    now: Timestamp,
    mode: ScheduleMode,
) -> Result<CheckedSchedule, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut checked = CheckedSchedule::default();
    let today = now.date();

    match input.session_date {
        Some(raw) => {
            if let Some(date) = errors.check(parse_session_date(raw)) {
                if date < today {
                    errors.push(ValidationError::invalid_schedule(
                        "sessionDate",
                        "Session date cannot be in the past",
                    ));
                } else {
                    checked.session_date = Some(date);
                }
            }
        }
        None if mode == ScheduleMode::Create => {
            errors.push(ValidationError::required("sessionDate"))
        }
        None => {}
    }

    match input.start_time {
        Some(raw) => checked.start_time = errors.check(StartTime::parse(raw)),
        None if mode == ScheduleMode::Create => errors.push(ValidationError::required("startTime")),
        None => {}
    }

    match input.meeting_link {
        Some(raw) => checked.meeting_link = errors.check(MeetingLink::parse(raw)),
        None if mode == ScheduleMode::Create => {
            errors.push(ValidationError::required("meetingLink"))
        }
        None => {}
    }

    if mode == ScheduleMode::Create {
        if let (Some(date), Some(time)) = (checked.session_date, checked.start_time) {
            let starts_at = Timestamp::from_date_and_time(date, time.as_naive_time());
            if !starts_at.is_after(&now) {
                errors.push(ValidationError::invalid_schedule(
                    "startTime",
                    "Session must start in the future",
                ));
            }
        }
    }

    errors.into_result().map(|_| checked)
}
