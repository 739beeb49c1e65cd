//! State machine trait for status enums.
//!
//! Gives lifecycle enums a single place to declare their legal moves, and a
//! checked `transition_to` built on top of it.

use super::{DomainError, ErrorCode};

/// A status enum whose values form a transition graph.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if a transition from self to target is legal.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all legal target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs the transition, or fails with `InvalidStateTransition`.
    fn transition_to(&self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// A state with no outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
