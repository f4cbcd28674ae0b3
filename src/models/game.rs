//! Match (bracket node), Slot and MatchScore.

use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a match (`match<order>`).
pub type MatchId = String;

/// Which of the two participant slots of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    /// Slot a feeder match at `position` fills in the next round.
    pub fn for_position(position: usize) -> Self {
        if position % 2 == 0 {
            Slot::One
        } else {
            Slot::Two
        }
    }

    pub fn other(self) -> Self {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

/// Final score of a match, player 1 being the participant in slot one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub player1: u32,
    pub player2: u32,
}

impl MatchScore {
    pub fn new(player1: u32, player2: u32) -> Self {
        Self { player1, player2 }
    }

    /// Winning slot, or None on a tie.
    pub fn winner(&self) -> Option<Slot> {
        match self.player1.cmp(&self.player2) {
            std::cmp::Ordering::Greater => Some(Slot::One),
            std::cmp::Ordering::Less => Some(Slot::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A single bracket node: two participant slots that are filled as feeder matches complete.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentMatch {
    pub id: MatchId,
    pub participant1: Option<ParticipantId>,
    pub participant2: Option<ParticipantId>,
    /// None if not yet played.
    pub winner: Option<ParticipantId>,
    pub is_completed: bool,
    /// 1 = first round played.
    pub round: u32,
    /// Index of the match inside its round.
    pub position: usize,
    pub score: Option<MatchScore>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TournamentMatch {
    /// Create an unplayed match. `order` is the 1-based match order used for the id.
    pub fn new(
        order: usize,
        round: u32,
        position: usize,
        participant1: Option<ParticipantId>,
        participant2: Option<ParticipantId>,
    ) -> Self {
        Self {
            id: format!("match{order}"),
            participant1,
            participant2,
            winner: None,
            is_completed: false,
            round,
            position,
            score: None,
            completed_at: None,
        }
    }

    pub fn participant(&self, slot: Slot) -> Option<&ParticipantId> {
        match slot {
            Slot::One => self.participant1.as_ref(),
            Slot::Two => self.participant2.as_ref(),
        }
    }

    /// Both slots filled and not yet played.
    pub fn is_playable(&self) -> bool {
        !self.is_completed && self.participant1.is_some() && self.participant2.is_some()
    }

    /// Slot holding the given participant, if any.
    pub fn slot_of(&self, participant_id: &str) -> Option<Slot> {
        if self.participant1.as_deref() == Some(participant_id) {
            Some(Slot::One)
        } else if self.participant2.as_deref() == Some(participant_id) {
            Some(Slot::Two)
        } else {
            None
        }
    }

    pub(crate) fn fill(&mut self, slot: Slot, participant_id: ParticipantId) {
        match slot {
            Slot::One => self.participant1 = Some(participant_id),
            Slot::Two => self.participant2 = Some(participant_id),
        }
    }
}
