//! Match-runner seam: the config handed to whoever plays a match, the ticket identifying the
//! running match, and a simulated runner for AI-vs-AI matches.

use crate::models::{Bracket, MatchId, MatchScore, Participant, TournamentId, TournamentMatch};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Points needed to win a simulated match.
pub const DEFAULT_POINTS_TO_WIN: u32 = 11;

/// Who controls a paddle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    Human,
    Ai,
}

/// Paddle side; player 1 plays left.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayer {
    pub name: String,
    pub kind: PlayerKind,
    pub side: Side,
}

impl MatchPlayer {
    fn new(participant: &Participant, side: Side) -> Self {
        Self {
            name: participant.name.clone(),
            kind: if participant.is_ai {
                PlayerKind::Ai
            } else {
                PlayerKind::Human
            },
            side,
        }
    }
}

/// Everything the runner needs to play one bracket match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub match_id: MatchId,
    pub round: u32,
    pub round_label: String,
    /// `[left, right]`, i.e. slot one then slot two.
    pub players: [MatchPlayer; 2],
}

impl MatchConfig {
    /// Build the config for a playable match. None if a slot is still empty.
    pub fn for_match(bracket: &Bracket, m: &TournamentMatch) -> Option<Self> {
        let p1 = m.participant1.as_deref().and_then(|id| bracket.participant(id))?;
        let p2 = m.participant2.as_deref().and_then(|id| bracket.participant(id))?;
        Some(Self {
            match_id: m.id.clone(),
            round: m.round,
            round_label: bracket.round_label(m.round),
            players: [MatchPlayer::new(p1, Side::Left), MatchPlayer::new(p2, Side::Right)],
        })
    }

    /// Both paddles are AI-controlled.
    pub fn is_ai_only(&self) -> bool {
        self.players.iter().all(|p| p.kind == PlayerKind::Ai)
    }
}

/// Handle for the single match in flight. Results and cancellations must present it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchTicket {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub config: MatchConfig,
}

/// Plays one match at a time and eventually yields its score.
#[allow(async_fn_in_trait)]
pub trait MatchRunner {
    /// Play the match. `None` means the match was quit before a result existed.
    async fn run_match(&mut self, config: &MatchConfig) -> Option<MatchScore>;

    /// Called after every match, finished or quit.
    fn teardown(&mut self) {}
}

/// Rally-by-rally simulation: each point is a coin flip, first to `points_to_win` wins.
#[derive(Debug)]
pub struct SimulatedRunner {
    points_to_win: u32,
    rng: StdRng,
}

impl SimulatedRunner {
    pub fn new(points_to_win: u32) -> Self {
        Self {
            points_to_win: points_to_win.max(1),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic runner for reproducible brackets.
    pub fn with_seed(points_to_win: u32, seed: u64) -> Self {
        Self {
            points_to_win: points_to_win.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Play out one match. Never returns a tie.
    pub fn simulate(&mut self) -> MatchScore {
        let mut score = MatchScore::default();
        while score.player1 < self.points_to_win && score.player2 < self.points_to_win {
            if self.rng.gen_bool(0.5) {
                score.player1 += 1;
            } else {
                score.player2 += 1;
            }
        }
        score
    }
}

impl Default for SimulatedRunner {
    fn default() -> Self {
        Self::new(DEFAULT_POINTS_TO_WIN)
    }
}

impl MatchRunner for SimulatedRunner {
    async fn run_match(&mut self, _config: &MatchConfig) -> Option<MatchScore> {
        Some(self.simulate())
    }
}
