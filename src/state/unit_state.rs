/// Unit-of-work state definitions
///
/// Every URL in a batch moves through the same small state machine under all
/// three strategies: `Pending -> InFlight -> {Succeeded | Failed}`.
use crate::DispatchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of a single unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitState {
    // ===== Active States =====
    /// Unit has been submitted but not yet started
    Pending,

    /// Request has been issued and the unit is awaiting completion
    InFlight,

    // ===== Terminal States =====
    /// Body was fetched and written to disk
    Succeeded,

    /// Fetch or write failed; never retried
    Failed,
}

impl UnitState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Moves to `to` if the transition is legal
    ///
    /// # Returns
    ///
    /// * `Ok(UnitState)` - The new state
    /// * `Err(DispatchError::InvalidTransition)` - The transition is not allowed
    pub fn transition(self, to: UnitState) -> Result<UnitState, DispatchError> {
        match (self, to) {
            (Self::Pending, Self::InFlight)
            | (Self::InFlight, Self::Succeeded)
            | (Self::InFlight, Self::Failed) => Ok(to),
            (from, to) => Err(DispatchError::InvalidTransition { from, to }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible unit states
    pub fn all_states() -> Vec<Self> {
        vec![Self::Pending, Self::InFlight, Self::Succeeded, Self::Failed]
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
