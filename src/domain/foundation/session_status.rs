//! SessionStatus enum for tracking lifecycle of interview sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of an interview session.
///
/// Valid transitions:
/// - NotStarted -> Active
/// - Active -> Completed
/// - Active -> Abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    NotStarted,
    Active,
    Completed,
    Abandoned,
}

impl SessionStatus {
    /// Returns true if the session can record answers or navigate.
    pub fn is_mutable(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }

    /// Returns true if the session has ended.
    pub fn is_terminal_status(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Abandoned)
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (NotStarted, Active) | (Active, Completed) | (Active, Abandoned)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            NotStarted => vec![Active],
            Active => vec![Completed, Abandoned],
            Completed => vec![],
            Abandoned => vec![],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::NotStarted => "NotStarted",
            SessionStatus::Active => "Active",
            SessionStatus::Completed => "Completed",
            SessionStatus::Abandoned => "Abandoned",
        };
        write!(f, "{}", s)
    }
}
