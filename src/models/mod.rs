//! Data structures for the pong tournament: participants, matches, bracket, tournament state.

mod bracket;
mod game;
mod participant;
mod tournament;

pub use bracket::Bracket;
pub use game::{MatchId, MatchScore, Slot, TournamentMatch};
pub use participant::{Participant, ParticipantEntry, ParticipantId};
pub use tournament::{TournamentError, TournamentId, TournamentState};
