//! Participant data structures.

use serde::{Deserialize, Serialize};

/// Stable identifier for a participant (`participant_<index>`), used for lookups through the bracket.
pub type ParticipantId = String;

/// Input record for one competitor when a tournament is started.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub name: String,
    #[serde(default)]
    pub is_ai: bool,
}

impl ParticipantEntry {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_ai: false,
        }
    }

    pub fn ai(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_ai: true,
        }
    }
}

/// A competitor in the bracket (human or AI).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub is_ai: bool,
    /// Set once, when the participant loses a match.
    pub is_eliminated: bool,
}

impl Participant {
    /// Create a participant from its input entry and position in the input list.
    pub fn new(index: usize, entry: &ParticipantEntry) -> Self {
        Self {
            id: format!("participant_{index}"),
            name: entry.name.clone(),
            is_ai: entry.is_ai,
            is_eliminated: false,
        }
    }

    /// Mark the participant as eliminated.
    pub fn eliminate(&mut self) {
        self.is_eliminated = true;
    }
}
