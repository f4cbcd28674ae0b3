//! Controller: translates UI intents into manager calls and relays results to the presentation layer.
//!
//! Presentation failures are logged and swallowed here; they never reach the manager or bracket.

use crate::logic::manager::{MatchOutcome, TournamentManager};
use crate::logic::runner::{MatchRunner, MatchTicket, SimulatedRunner};
use crate::models::{
    Bracket, MatchScore, Participant, ParticipantEntry, TournamentError, TournamentMatch,
    TournamentState,
};
use log::{debug, info, warn};

/// Failure reported by a presentation collaborator (e.g. an overlay that is not built yet).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ViewError {
    pub message: String,
}

impl ViewError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view error: {}", self.message)
    }
}

impl std::error::Error for ViewError {}

/// Whatever displays the bracket. Notified after every state change the user should see.
pub trait TournamentView: Send + Sync {
    /// Bracket overlay goes away while a match is played.
    fn hide_bracket(&mut self) -> Result<(), ViewError>;

    fn show_bracket(&mut self, bracket: &Bracket) -> Result<(), ViewError>;

    fn match_completed(&mut self, _outcome: &MatchOutcome, bracket: &Bracket) -> Result<(), ViewError> {
        self.show_bracket(bracket)
    }

    fn show_champion(&mut self, _champion: &Participant, bracket: &Bracket) -> Result<(), ViewError> {
        self.show_bracket(bracket)
    }
}

/// Run one view callback, logging (not propagating) its failure.
fn notify<F>(view: &mut Option<Box<dyn TournamentView>>, what: &str, f: F)
where
    F: FnOnce(&mut dyn TournamentView) -> Result<(), ViewError>,
{
    match view.as_deref_mut() {
        Some(v) => {
            if let Err(e) = f(v) {
                warn!("Could not {}: {}", what, e);
            }
        }
        None => debug!("No view attached, skipping {}", what),
    }
}

/// Facade over a single active tournament.
#[derive(Default)]
pub struct TournamentController {
    manager: Option<TournamentManager>,
    is_active: bool,
    view: Option<Box<dyn TournamentView>>,
}

impl TournamentController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(view: Box<dyn TournamentView>) -> Self {
        Self {
            view: Some(view),
            ..Self::default()
        }
    }

    pub fn set_view(&mut self, view: Box<dyn TournamentView>) {
        self.view = Some(view);
    }

    pub fn clear_view(&mut self) {
        self.view = None;
    }

    /// Start a new tournament with a fresh manager. Any previous tournament is dropped.
    pub fn start_tournament(&mut self, entries: &[ParticipantEntry]) -> Result<(), TournamentError> {
        let mut manager = TournamentManager::new();
        if let Err(e) = manager.start_tournament(entries) {
            warn!("Could not start tournament: {}", e);
            return Err(e);
        }
        if let Some(old) = self.manager.replace(manager) {
            if old.is_match_in_progress() {
                warn!("Dropping tournament {} with a match in progress", old.id());
            }
        }
        self.is_active = true;

        if let Some(bracket) = self.manager.as_ref().and_then(|m| m.bracket()) {
            info!("Tournament created, first match: {}", self.tournament_status());
            notify(&mut self.view, "show bracket", |v| v.show_bracket(bracket));
        }
        Ok(())
    }

    fn active_manager_mut(&mut self) -> Result<&mut TournamentManager, TournamentError> {
        if !self.is_active {
            return Err(TournamentError::NoActiveTournament);
        }
        self.manager
            .as_mut()
            .ok_or(TournamentError::NoActiveTournament)
    }

    /// Start the next match and hide the bracket overlay.
    pub fn start_next_match(&mut self) -> Result<MatchTicket, TournamentError> {
        let ticket = self.active_manager_mut()?.start_next_match()?;
        notify(&mut self.view, "hide bracket", |v| v.hide_bracket());
        Ok(ticket)
    }

    /// Forward a runner result, then relay the outcome to the view.
    pub fn report_result(
        &mut self,
        ticket: &MatchTicket,
        score: MatchScore,
    ) -> Result<MatchOutcome, TournamentError> {
        let manager = self
            .manager
            .as_mut()
            .ok_or(TournamentError::NoActiveTournament)?;
        let outcome = manager.report_result(ticket, score)?;
        self.relay_outcome(&outcome);
        Ok(outcome)
    }

    /// Abort the match in flight and return to the bracket.
    pub fn cancel_match(&mut self, ticket: &MatchTicket) -> Result<(), TournamentError> {
        let manager = self
            .manager
            .as_mut()
            .ok_or(TournamentError::NoActiveTournament)?;
        manager.cancel_match(ticket)?;
        if let Some(bracket) = manager.bracket() {
            notify(&mut self.view, "show bracket", |v| v.show_bracket(bracket));
        }
        Ok(())
    }

    /// Play the next match through `runner`. `Ok(None)` when the match was quit.
    pub async fn play_next_match<R: MatchRunner>(
        &mut self,
        runner: &mut R,
    ) -> Result<Option<MatchOutcome>, TournamentError> {
        let manager = self.active_manager_mut()?;
        let hidden = manager.state() == TournamentState::Ready && manager.current_match().is_some();
        if hidden {
            notify(&mut self.view, "hide bracket", |v| v.hide_bracket());
        }

        let result = self.active_manager_mut()?.play_next_match(runner).await;
        match result {
            Ok(Some(outcome)) => {
                self.relay_outcome(&outcome);
                Ok(Some(outcome))
            }
            Ok(None) => {
                self.refresh_bracket_view();
                Ok(None)
            }
            Err(e) => {
                if hidden {
                    self.refresh_bracket_view();
                }
                Err(e)
            }
        }
    }

    /// Play the next match on the spot with the simulated runner. Both players must be AI.
    pub fn simulate_next_match(
        &mut self,
        runner: &mut SimulatedRunner,
    ) -> Result<MatchOutcome, TournamentError> {
        let ticket = self.start_next_match()?;
        if !ticket.config.is_ai_only() {
            self.cancel_match(&ticket)?;
            return Err(TournamentError::HumanPlayerInMatch(ticket.match_id));
        }
        let score = runner.simulate();
        runner.teardown();
        self.report_result(&ticket, score)
    }

    fn refresh_bracket_view(&mut self) {
        if let Some(bracket) = self.manager.as_ref().and_then(|m| m.bracket()) {
            notify(&mut self.view, "show bracket", |v| v.show_bracket(bracket));
        }
    }

    fn relay_outcome(&mut self, outcome: &MatchOutcome) {
        info!("{} won {}", outcome.winner.name, outcome.completed.id);
        if outcome.champion.is_some() {
            self.is_active = false;
        }
        let Some(bracket) = self.manager.as_ref().and_then(|m| m.bracket()) else {
            return;
        };
        notify(&mut self.view, "update bracket", |v| v.match_completed(outcome, bracket));
        if let Some(champion) = &outcome.champion {
            info!("Congratulations to {}!", champion.name);
            notify(&mut self.view, "show champion", |v| v.show_champion(champion, bracket));
        }
    }

    pub fn manager(&self) -> Option<&TournamentManager> {
        self.manager.as_ref()
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.manager.as_ref().and_then(|m| m.bracket())
    }

    pub fn current_match(&self) -> Option<&TournamentMatch> {
        self.manager.as_ref().and_then(|m| m.current_match())
    }

    /// True from start until the champion is known.
    pub fn is_active_tournament(&self) -> bool {
        self.is_active
    }

    pub fn tournament_status(&self) -> String {
        match &self.manager {
            Some(m) => m.tournament_status(),
            None => "No active tournament".to_string(),
        }
    }
}
