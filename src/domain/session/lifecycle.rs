//! Time-driven status and enrollment rules for a session.
//!
//! Nothing here touches storage. Handlers load a session, apply these
//! operations with the current instant, then persist with a versioned write.

use crate::domain::foundation::{SessionStatus, StateMachine, Timestamp, UserId};

use super::aggregate::{Participant, Session};
use super::errors::SessionError;

/// Status the session should have at `now`.
///
/// Scheduled sessions become ongoing once `now` reaches the start and
/// completed once it passes the end; ongoing ones complete after the end.
/// Cancelled and completed are terminal.
pub fn derive_status(session: &Session, now: Timestamp) -> SessionStatus {
    let start = session.full_date_time();
    let end = session.end_date_time();

    match session.status() {
        SessionStatus::Scheduled if now > end => SessionStatus::Completed,
        SessionStatus::Scheduled if now >= start => SessionStatus::Ongoing,
        SessionStatus::Ongoing if now > end => SessionStatus::Completed,
        status => status,
    }
}

impl Session {
    /// Applies `derive_status`, returning whether the status moved.
    pub fn refresh_status(&mut self, now: Timestamp) -> bool {
        let derived = derive_status(self, now);
        if derived == self.status {
            return false;
        }
        self.status = derived;
        self.updated_at = now;
        true
    }

    pub fn is_enrolled(&self, user_id: &UserId) -> bool {
        self.enrolled_participants
            .iter()
            .any(|p| &p.user_id == user_id)
    }

    /// Reserves a seat for `user_id`.
    ///
    /// Checks run in order and the first failure wins: duplicate enrollment,
    /// capacity, start already passed, cancellation.
    pub fn enroll(&mut self, user_id: UserId, now: Timestamp) -> Result<(), SessionError> {
        if self.is_enrolled(&user_id) {
            return Err(SessionError::AlreadyEnrolled(user_id));
        }
        if self.is_full() {
            return Err(SessionError::SessionFull);
        }
        if self.full_date_time().is_before(&now) {
            return Err(SessionError::SessionInPast);
        }
        if self.status == SessionStatus::Cancelled {
            return Err(SessionError::SessionCancelled);
        }

        self.enrolled_participants.push(Participant {
            user_id,
            enrolled_at: now,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Releases the seat held by `user_id`. Returns false if there was none.
    pub fn withdraw(&mut self, user_id: &UserId, now: Timestamp) -> bool {
        let before = self.enrolled_participants.len();
        self.enrolled_participants.retain(|p| &p.user_id != user_id);
        let removed = self.enrolled_participants.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    /// Moves a scheduled or ongoing session to cancelled.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), SessionError> {
        self.refresh_status(now);
        self.status = self
            .status
            .transition_to(SessionStatus::Cancelled)
            .map_err(|_| {
                SessionError::invalid_state(format!(
                    "cannot cancel a session that is {}",
                    self.status
                ))
            })?;
        self.updated_at = now;
        Ok(())
    }
}
