//! Tournament orchestration: match runner seam, manager state machine, controller facade.

mod controller;
mod manager;
mod runner;

pub use controller::{TournamentController, TournamentView, ViewError};
pub use manager::{MatchOutcome, TournamentManager};
pub use runner::{
    MatchConfig, MatchPlayer, MatchRunner, MatchTicket, PlayerKind, Side, SimulatedRunner,
    DEFAULT_POINTS_TO_WIN,
};
