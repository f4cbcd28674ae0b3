//! Tournament manager: owns one bracket and hands its matches, one at a time, to a match runner.
//!
//! State machine: `NotStarted -> Ready -> MatchRunning -> Ready | Finished`. A manager is
//! single-use; a new tournament needs a new manager.

use crate::logic::runner::{MatchConfig, MatchRunner, MatchTicket};
use crate::models::{
    Bracket, MatchScore, Participant, ParticipantEntry, TournamentError, TournamentId,
    TournamentMatch, TournamentState,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

/// Result of recording a match: the completed match, its winner and, after the final, the champion.
#[derive(Clone, Debug, Serialize)]
pub struct MatchOutcome {
    pub completed: TournamentMatch,
    pub winner: Participant,
    pub champion: Option<Participant>,
}

#[derive(Debug)]
pub struct TournamentManager {
    id: TournamentId,
    created_at: DateTime<Utc>,
    bracket: Option<Bracket>,
    state: TournamentState,
    /// The only match in flight, if any.
    running: Option<MatchTicket>,
}

impl TournamentManager {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bracket: None,
            state: TournamentState::NotStarted,
            running: None,
        }
    }

    pub fn id(&self) -> TournamentId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> TournamentState {
        self.state
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    /// Next playable match in the bracket (not necessarily started).
    pub fn current_match(&self) -> Option<&TournamentMatch> {
        self.bracket.as_ref().and_then(|b| b.current_match())
    }

    /// Ticket of the match in flight.
    pub fn running_match(&self) -> Option<&MatchTicket> {
        self.running.as_ref()
    }

    pub fn is_match_in_progress(&self) -> bool {
        self.running.is_some()
    }

    pub fn champion(&self) -> Option<&Participant> {
        self.bracket.as_ref().and_then(|b| b.champion())
    }

    /// Build the bracket. Fails on a second call.
    pub fn start_tournament(&mut self, entries: &[ParticipantEntry]) -> Result<(), TournamentError> {
        if self.state != TournamentState::NotStarted {
            return Err(TournamentError::AlreadyStarted);
        }
        let bracket = Bracket::new(entries)?;
        info!(
            "Tournament {} started with {} participants ({} rounds)",
            self.id,
            entries.len(),
            bracket.rounds()
        );
        self.bracket = Some(bracket);
        self.state = TournamentState::Ready;
        Ok(())
    }

    /// Hand the next playable match to the runner. Only one match may be in flight.
    pub fn start_next_match(&mut self) -> Result<MatchTicket, TournamentError> {
        match self.state {
            TournamentState::NotStarted => return Err(TournamentError::NotStarted),
            TournamentState::MatchRunning => return Err(TournamentError::MatchAlreadyRunning),
            TournamentState::Finished => return Err(TournamentError::TournamentFinished),
            TournamentState::Ready => {}
        }
        let bracket = self.bracket.as_ref().ok_or(TournamentError::NotStarted)?;
        let next = bracket
            .current_match()
            .ok_or(TournamentError::NoCurrentMatch)?;
        let config = MatchConfig::for_match(bracket, next).ok_or(TournamentError::NoCurrentMatch)?;

        let ticket = MatchTicket {
            tournament_id: self.id,
            match_id: next.id.clone(),
            config,
        };
        info!(
            "Starting {} ({}): {} vs {}",
            ticket.match_id,
            ticket.config.round_label,
            ticket.config.players[0].name,
            ticket.config.players[1].name
        );
        self.running = Some(ticket.clone());
        self.state = TournamentState::MatchRunning;
        Ok(ticket)
    }

    fn check_ticket(&self, ticket: &MatchTicket) -> Result<(), TournamentError> {
        if ticket.tournament_id != self.id {
            return Err(TournamentError::StaleTicket);
        }
        match &self.running {
            None => Err(TournamentError::NoMatchRunning),
            Some(running) if running.match_id != ticket.match_id => Err(TournamentError::StaleTicket),
            Some(_) => Ok(()),
        }
    }

    /// Record the runner's result for the match in flight.
    ///
    /// A tie is rejected and the match stays in flight until a decisive score is reported or the
    /// match is cancelled.
    pub fn report_result(
        &mut self,
        ticket: &MatchTicket,
        score: MatchScore,
    ) -> Result<MatchOutcome, TournamentError> {
        self.check_ticket(ticket)?;
        let Some(slot) = score.winner() else {
            warn!(
                "Rejected tied result {}-{} for {}",
                score.player1, score.player2, ticket.match_id
            );
            return Err(TournamentError::InvalidResult);
        };

        let bracket = self.bracket.as_mut().ok_or(TournamentError::NotStarted)?;
        let winner_id = bracket
            .get_match(&ticket.match_id)
            .ok_or_else(|| TournamentError::UnknownMatch(ticket.match_id.clone()))?
            .participant(slot)
            .cloned()
            .ok_or_else(|| TournamentError::MatchNotReady(ticket.match_id.clone()))?;
        bracket.complete_match(&ticket.match_id, &winner_id, score)?;
        self.running = None;

        let completed = bracket
            .get_match(&ticket.match_id)
            .cloned()
            .ok_or_else(|| TournamentError::UnknownMatch(ticket.match_id.clone()))?;
        let winner = bracket
            .participant(&winner_id)
            .cloned()
            .ok_or_else(|| TournamentError::WinnerNotInMatch(ticket.match_id.clone()))?;
        info!(
            "{} finished: {} {}-{} {}",
            completed.id,
            bracket.participant_name(completed.participant1.as_deref()),
            score.player1,
            score.player2,
            bracket.participant_name(completed.participant2.as_deref())
        );
        debug!("Bracket state:\n{}", bracket.describe());

        let champion = if bracket.is_completed() {
            self.state = TournamentState::Finished;
            let champion = bracket.champion().cloned();
            if let Some(c) = &champion {
                info!("Tournament {} finished, champion: {}", self.id, c.name);
            }
            champion
        } else {
            self.state = TournamentState::Ready;
            None
        };

        Ok(MatchOutcome {
            completed,
            winner,
            champion,
        })
    }

    /// Abort the match in flight. No score is recorded and the match can be started again.
    pub fn cancel_match(&mut self, ticket: &MatchTicket) -> Result<(), TournamentError> {
        self.check_ticket(ticket)?;
        info!("{} cancelled, back to the bracket", ticket.match_id);
        self.running = None;
        self.state = TournamentState::Ready;
        Ok(())
    }

    /// Start the next match, await the runner and record (or cancel) it.
    ///
    /// Returns `Ok(None)` when the runner quit the match. The runner's teardown hook runs either way.
    pub async fn play_next_match<R: MatchRunner>(
        &mut self,
        runner: &mut R,
    ) -> Result<Option<MatchOutcome>, TournamentError> {
        let ticket = self.start_next_match()?;
        let result = runner.run_match(&ticket.config).await;
        runner.teardown();

        match result {
            Some(score) => match self.report_result(&ticket, score) {
                Ok(outcome) => Ok(Some(outcome)),
                Err(e) => {
                    self.cancel_match(&ticket)?;
                    Err(e)
                }
            },
            None => {
                self.cancel_match(&ticket)?;
                Ok(None)
            }
        }
    }

    /// Short description: champion, pending match, or waiting.
    pub fn tournament_status(&self) -> String {
        let Some(bracket) = &self.bracket else {
            return "Tournament not started".to_string();
        };
        if bracket.is_completed() {
            let name = bracket.champion().map(|c| c.name.as_str()).unwrap_or("unknown");
            return format!("Tournament finished! Champion: {}", name);
        }
        match bracket.current_match() {
            Some(m) => format!(
                "{}: {} vs {}",
                bracket.round_label(m.round),
                bracket.participant_name(m.participant1.as_deref()),
                bracket.participant_name(m.participant2.as_deref())
            ),
            None => "Waiting for the next match".to_string(),
        }
    }
}

impl Default for TournamentManager {
    fn default() -> Self {
        Self::new()
    }
}
