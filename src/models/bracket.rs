//! Single-elimination bracket: construction, next playable match, result recording and winner propagation.
//!
//! Matches are stored in round-then-position order. Round `r` (1-based) holds `N >> r` matches and
//! starts at index `N - (N >> (r - 1))`; the winner of the match at position `p` fills slot `p % 2`
//! of the match at position `p / 2` in round `r + 1`.

use crate::models::game::{MatchScore, Slot, TournamentMatch};
use crate::models::participant::{Participant, ParticipantEntry};
use crate::models::tournament::TournamentError;
use chrono::Utc;
use log::debug;
use serde::Serialize;

/// The full match tree for a fixed, power-of-two set of participants.
#[derive(Clone, Debug, Serialize)]
pub struct Bracket {
    participants: Vec<Participant>,
    matches: Vec<TournamentMatch>,
    rounds: u32,
}

impl Bracket {
    /// Build the bracket: round 1 pairs participants in input order (`[0] vs [1]`, `[2] vs [3]`, ...),
    /// later rounds start with both slots empty.
    pub fn new(entries: &[ParticipantEntry]) -> Result<Self, TournamentError> {
        let n = entries.len();
        if n < 2 || !n.is_power_of_two() {
            return Err(TournamentError::InvalidBracketSize(n));
        }

        let participants: Vec<Participant> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| Participant::new(i, e))
            .collect();
        let rounds = n.trailing_zeros();

        let mut matches = Vec::with_capacity(n - 1);
        for (position, pair) in participants.chunks_exact(2).enumerate() {
            let order = matches.len() + 1;
            matches.push(TournamentMatch::new(
                order,
                1,
                position,
                Some(pair[0].id.clone()),
                Some(pair[1].id.clone()),
            ));
        }
        for round in 2..=rounds {
            for position in 0..(n >> round) {
                let order = matches.len() + 1;
                matches.push(TournamentMatch::new(order, round, position, None, None));
            }
        }

        Ok(Self {
            participants,
            matches,
            rounds,
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// All matches, round by round.
    pub fn matches(&self) -> &[TournamentMatch] {
        &self.matches
    }

    /// Number of rounds (log2 of the participant count).
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn matches_in_round(&self, round: u32) -> &[TournamentMatch] {
        if round == 0 || round > self.rounds {
            return &[];
        }
        let start = self.round_start(round);
        let len = self.participants.len() >> round;
        &self.matches[start..start + len]
    }

    pub fn get_match(&self, match_id: &str) -> Option<&TournamentMatch> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    /// Look up a participant by id.
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    fn participant_mut(&mut self, id: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Display name for an optional slot ("TBD" while empty).
    pub fn participant_name(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.participant(id))
            .map(|p| p.name.as_str())
            .unwrap_or("TBD")
    }

    /// Human-readable name of a round, counted from the final backwards.
    pub fn round_label(&self, round: u32) -> String {
        match self.rounds.saturating_sub(round) {
            0 => "Final".to_string(),
            1 => "Semi-final".to_string(),
            2 => "Quarter-final".to_string(),
            _ => format!(
                "Round of {}",
                self.participants.len() >> round.saturating_sub(1)
            ),
        }
    }

    fn round_start(&self, round: u32) -> usize {
        let n = self.participants.len();
        n - (n >> (round - 1))
    }

    /// Earliest (round, then position) match with both slots filled and no result yet.
    pub fn current_match(&self) -> Option<&TournamentMatch> {
        self.matches.iter().find(|m| m.is_playable())
    }

    /// Record the result of a match and move the winner into the next round.
    ///
    /// Any error leaves the bracket unchanged, so completing the same match twice is rejected
    /// by the completed check.
    pub fn complete_match(
        &mut self,
        match_id: &str,
        winner_id: &str,
        score: MatchScore,
    ) -> Result<(), TournamentError> {
        let idx = self
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or_else(|| TournamentError::UnknownMatch(match_id.to_string()))?;

        let m = &self.matches[idx];
        if m.is_completed {
            return Err(TournamentError::MatchAlreadyCompleted(match_id.to_string()));
        }
        if !m.is_playable() {
            return Err(TournamentError::MatchNotReady(match_id.to_string()));
        }
        let winner_slot = m
            .slot_of(winner_id)
            .ok_or_else(|| TournamentError::WinnerNotInMatch(match_id.to_string()))?;
        let loser_id = m.participant(winner_slot.other()).cloned();
        let (round, position) = (m.round, m.position);

        let m = &mut self.matches[idx];
        m.winner = Some(winner_id.to_string());
        m.score = Some(score);
        m.is_completed = true;
        m.completed_at = Some(Utc::now());

        if let Some(loser_id) = loser_id {
            if let Some(loser) = self.participant_mut(&loser_id) {
                loser.eliminate();
            }
        }

        if round < self.rounds {
            let next = self.round_start(round + 1) + position / 2;
            let slot = Slot::for_position(position);
            let next_match = &mut self.matches[next];
            next_match.fill(slot, winner_id.to_string());
            debug!(
                "{} advances from {} to {} ({:?})",
                winner_id, match_id, next_match.id, slot
            );
        }
        Ok(())
    }

    /// True once every match has a result.
    pub fn is_completed(&self) -> bool {
        self.matches.iter().all(|m| m.is_completed)
    }

    /// The final match (last round).
    pub fn final_match(&self) -> Option<&TournamentMatch> {
        self.matches.last()
    }

    /// Winner of the final, once it is played.
    pub fn champion(&self) -> Option<&Participant> {
        self.final_match()
            .filter(|m| m.is_completed)
            .and_then(|m| m.winner.as_deref())
            .and_then(|id| self.participant(id))
    }

    /// One line per match, e.g. `match1: A vs B - A wins (11-5)`.
    pub fn describe(&self) -> String {
        self.matches
            .iter()
            .map(|m| {
                let status = match (&m.winner, &m.score) {
                    (Some(w), Some(s)) => format!(
                        "{} wins ({}-{})",
                        self.participant_name(Some(w.as_str())),
                        s.player1,
                        s.player2
                    ),
                    _ => "pending".to_string(),
                };
                format!(
                    "{}: {} vs {} - {}",
                    m.id,
                    self.participant_name(m.participant1.as_deref()),
                    self.participant_name(m.participant2.as_deref()),
                    status
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
