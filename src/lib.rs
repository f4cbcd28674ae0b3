//! Pong tournament: single-elimination bracket engine with a match-runner handoff.

pub mod logic;
pub mod models;

pub use logic::{
    MatchConfig, MatchOutcome, MatchPlayer, MatchRunner, MatchTicket, PlayerKind, Side,
    SimulatedRunner, TournamentController, TournamentManager, TournamentView, ViewError,
    DEFAULT_POINTS_TO_WIN,
};
pub use models::{
    Bracket, MatchId, MatchScore, Participant, ParticipantEntry, ParticipantId, Slot,
    TournamentError, TournamentId, TournamentMatch, TournamentState,
};
