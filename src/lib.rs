//! Live Classes - scheduling and enrollment for live online class sessions.
//!
//! Sessions are scheduled by staff, carry a Zoom or Google Meet link, and
//! accept enrollments up to a fixed capacity. Their status follows the wall
//! clock: it is derived from the start time and duration whenever a session
//! is read or written, so no background scheduler is needed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
