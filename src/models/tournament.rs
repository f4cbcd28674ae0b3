//! TournamentError, TournamentId and TournamentState.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
///
/// Every error is recoverable: the caller retries with valid arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Participant count is not a power of two, or below 2.
    InvalidBracketSize(usize),
    /// The manager already runs a tournament (managers are single-use).
    AlreadyStarted,
    /// No tournament has been started on this manager.
    NotStarted,
    /// The controller has no active tournament.
    NoActiveTournament,
    /// No match has both slots filled and is still unplayed.
    NoCurrentMatch,
    /// A match is already in progress.
    MatchAlreadyRunning,
    /// A result or cancellation arrived while no match is running.
    NoMatchRunning,
    /// The ticket does not belong to the running match of this tournament.
    StaleTicket,
    /// The tournament already has a champion.
    TournamentFinished,
    /// Tied score (the runner must resolve ties before reporting).
    InvalidResult,
    /// No match with this id exists in the bracket.
    UnknownMatch(String),
    /// The match already has a winner.
    MatchAlreadyCompleted(String),
    /// At least one slot of the match is still empty.
    MatchNotReady(String),
    /// The winner id is not one of the match's participants.
    WinnerNotInMatch(String),
    /// Only AI-vs-AI matches can be simulated.
    HumanPlayerInMatch(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidBracketSize(n) => write!(
                f,
                "A bracket needs a power of two participants (at least 2), got {}",
                n
            ),
            TournamentError::AlreadyStarted => write!(f, "Tournament already started"),
            TournamentError::NotStarted => write!(f, "Tournament not started"),
            TournamentError::NoActiveTournament => write!(f, "No active tournament"),
            TournamentError::NoCurrentMatch => write!(f, "No match ready to be played"),
            TournamentError::MatchAlreadyRunning => write!(f, "A match is already in progress"),
            TournamentError::NoMatchRunning => write!(f, "No match in progress"),
            TournamentError::StaleTicket => {
                write!(f, "Ticket does not belong to the match in progress")
            }
            TournamentError::TournamentFinished => write!(f, "Tournament already finished"),
            TournamentError::InvalidResult => write!(f, "A match result cannot be a tie"),
            TournamentError::UnknownMatch(id) => write!(f, "Match {} not found", id),
            TournamentError::MatchAlreadyCompleted(id) => {
                write!(f, "Match {} is already completed", id)
            }
            TournamentError::MatchNotReady(id) => {
                write!(f, "Match {} is still waiting for participants", id)
            }
            TournamentError::WinnerNotInMatch(id) => {
                write!(f, "Winner is not a participant of match {}", id)
            }
            TournamentError::HumanPlayerInMatch(id) => {
                write!(f, "Match {} has a human player and cannot be simulated", id)
            }
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament (one per manager).
pub type TournamentId = Uuid;

/// Current phase of a tournament manager.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// No bracket yet.
    #[default]
    NotStarted,
    /// Waiting for the next match to be started.
    Ready,
    /// One match handed to the runner; waiting for its result.
    MatchRunning,
    /// Champion known; no further matches.
    Finished,
}
