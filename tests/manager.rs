//! Integration tests for the tournament manager state machine and runner handoff.

use pong_tournament::{
    MatchConfig, MatchRunner, MatchScore, ParticipantEntry, PlayerKind, Side, SimulatedRunner,
    TournamentError, TournamentManager, TournamentState,
};
use std::collections::VecDeque;

fn abcd() -> Vec<ParticipantEntry> {
    vec![
        ParticipantEntry::human("A"),
        ParticipantEntry::ai("B"),
        ParticipantEntry::human("C"),
        ParticipantEntry::ai("D"),
    ]
}

fn started(entries: &[ParticipantEntry]) -> TournamentManager {
    let mut m = TournamentManager::new();
    m.start_tournament(entries).unwrap();
    m
}

/// Replays scripted results; `None` simulates the user quitting.
#[derive(Default)]
struct ScriptedRunner {
    results: VecDeque<Option<MatchScore>>,
    seen: Vec<MatchConfig>,
    teardowns: usize,
}

impl ScriptedRunner {
    fn new(results: Vec<Option<MatchScore>>) -> Self {
        Self {
            results: results.into(),
            ..Self::default()
        }
    }
}

impl MatchRunner for ScriptedRunner {
    async fn run_match(&mut self, config: &MatchConfig) -> Option<MatchScore> {
        self.seen.push(config.clone());
        self.results.pop_front().flatten()
    }

    fn teardown(&mut self) {
        self.teardowns += 1;
    }
}

#[test]
fn manager_is_single_use() {
    let mut m = TournamentManager::new();
    assert_eq!(m.state(), TournamentState::NotStarted);
    assert_eq!(
        m.start_tournament(&abcd()[..3]).unwrap_err(),
        TournamentError::InvalidBracketSize(3)
    );
    assert_eq!(m.state(), TournamentState::NotStarted);

    m.start_tournament(&abcd()).unwrap();
    assert_eq!(m.state(), TournamentState::Ready);
    assert_eq!(m.start_tournament(&abcd()).unwrap_err(), TournamentError::AlreadyStarted);
}

#[test]
fn start_next_match_requires_started_tournament() {
    let mut m = TournamentManager::new();
    assert_eq!(m.start_next_match().unwrap_err(), TournamentError::NotStarted);
    assert_eq!(m.tournament_status(), "Tournament not started");
}

#[test]
fn ticket_carries_match_config() {
    let mut m = started(&abcd());
    let ticket = m.start_next_match().unwrap();
    assert_eq!(ticket.tournament_id, m.id());
    assert_eq!(ticket.match_id, "match1");
    assert_eq!(ticket.config.round, 1);
    assert_eq!(ticket.config.round_label, "Semi-final");
    assert_eq!(ticket.config.players[0].name, "A");
    assert_eq!(ticket.config.players[0].kind, PlayerKind::Human);
    assert_eq!(ticket.config.players[0].side, Side::Left);
    assert_eq!(ticket.config.players[1].name, "B");
    assert_eq!(ticket.config.players[1].kind, PlayerKind::Ai);
    assert_eq!(ticket.config.players[1].side, Side::Right);
    assert!(!ticket.config.is_ai_only());
}

#[test]
fn second_start_while_running_is_rejected() {
    let mut m = started(&abcd());
    let ticket = m.start_next_match().unwrap();
    let before = m.bracket().unwrap().matches().to_vec();

    assert_eq!(m.start_next_match().unwrap_err(), TournamentError::MatchAlreadyRunning);
    assert_eq!(m.state(), TournamentState::MatchRunning);
    assert_eq!(m.running_match(), Some(&ticket));
    assert_eq!(m.bracket().unwrap().matches(), &before[..]);
}

#[test]
fn four_player_tournament_runs_to_champion() {
    let mut m = started(&abcd());
    assert_eq!(m.tournament_status(), "Semi-final: A vs B");

    let t1 = m.start_next_match().unwrap();
    let out = m.report_result(&t1, MatchScore::new(11, 5)).unwrap();
    assert_eq!(out.winner.name, "A");
    assert!(out.champion.is_none());
    assert_eq!(out.completed.score, Some(MatchScore::new(11, 5)));
    assert_eq!(m.state(), TournamentState::Ready);
    assert_eq!(m.tournament_status(), "Semi-final: C vs D");

    let t2 = m.start_next_match().unwrap();
    let out = m.report_result(&t2, MatchScore::new(3, 11)).unwrap();
    assert_eq!(out.winner.name, "D");
    assert_eq!(m.tournament_status(), "Final: A vs D");

    let t3 = m.start_next_match().unwrap();
    assert_eq!(t3.config.round_label, "Final");
    let out = m.report_result(&t3, MatchScore::new(11, 9)).unwrap();
    assert_eq!(out.champion.as_ref().map(|c| c.name.as_str()), Some("A"));

    assert_eq!(m.state(), TournamentState::Finished);
    assert!(m.bracket().unwrap().is_completed());
    assert_eq!(m.champion().unwrap().name, "A");
    assert_eq!(m.tournament_status(), "Tournament finished! Champion: A");
    assert_eq!(m.start_next_match().unwrap_err(), TournamentError::TournamentFinished);
}

#[test]
fn tie_is_rejected_and_match_stays_running() {
    let mut m = started(&abcd());
    let ticket = m.start_next_match().unwrap();
    assert_eq!(
        m.report_result(&ticket, MatchScore::new(7, 7)).unwrap_err(),
        TournamentError::InvalidResult
    );
    assert_eq!(m.state(), TournamentState::MatchRunning);
    assert!(!m.bracket().unwrap().get_match("match1").unwrap().is_completed);

    let out = m.report_result(&ticket, MatchScore::new(9, 11)).unwrap();
    assert_eq!(out.winner.name, "B");
}

#[test]
fn cancelled_match_can_be_started_again() {
    let mut m = started(&abcd());
    let ticket = m.start_next_match().unwrap();
    m.cancel_match(&ticket).unwrap();

    assert_eq!(m.state(), TournamentState::Ready);
    assert!(!m.is_match_in_progress());
    let m1 = m.bracket().unwrap().get_match("match1").unwrap();
    assert!(!m1.is_completed);
    assert!(m1.score.is_none());
    assert!(m.bracket().unwrap().participants().iter().all(|p| !p.is_eliminated));

    assert_eq!(
        m.report_result(&ticket, MatchScore::new(11, 0)).unwrap_err(),
        TournamentError::NoMatchRunning
    );
    let again = m.start_next_match().unwrap();
    assert_eq!(again.match_id, "match1");
}

#[test]
fn stale_tickets_cannot_touch_another_tournament() {
    let mut old = started(&abcd());
    let old_ticket = old.start_next_match().unwrap();

    let mut fresh = started(&abcd());
    let fresh_ticket = fresh.start_next_match().unwrap();
    assert_eq!(old_ticket.match_id, fresh_ticket.match_id);

    assert_eq!(
        fresh.report_result(&old_ticket, MatchScore::new(11, 0)).unwrap_err(),
        TournamentError::StaleTicket
    );
    assert_eq!(fresh.cancel_match(&old_ticket).unwrap_err(), TournamentError::StaleTicket);
    assert_eq!(fresh.state(), TournamentState::MatchRunning);
    assert!(!fresh.bracket().unwrap().get_match("match1").unwrap().is_completed);

    // A ticket for an already finished match of the same tournament is stale too.
    fresh.report_result(&fresh_ticket, MatchScore::new(11, 0)).unwrap();
    let next = fresh.start_next_match().unwrap();
    assert_eq!(
        fresh.report_result(&fresh_ticket, MatchScore::new(0, 11)).unwrap_err(),
        TournamentError::StaleTicket
    );
    assert_eq!(fresh.running_match(), Some(&next));
}

#[tokio::test]
async fn play_next_match_awaits_runner_and_tears_down() {
    let mut m = started(&abcd());
    let mut runner = ScriptedRunner::new(vec![
        Some(MatchScore::new(11, 5)),
        Some(MatchScore::new(3, 11)),
        Some(MatchScore::new(11, 9)),
    ]);

    for _ in 0..3 {
        let out = m.play_next_match(&mut runner).await.unwrap();
        assert!(out.is_some());
    }
    assert_eq!(runner.teardowns, 3);
    assert_eq!(
        runner.seen.iter().map(|c| c.match_id.as_str()).collect::<Vec<_>>(),
        ["match1", "match2", "match3"]
    );
    assert_eq!(m.champion().unwrap().name, "A");
    assert_eq!(
        m.play_next_match(&mut runner).await.unwrap_err(),
        TournamentError::TournamentFinished
    );
    assert_eq!(runner.teardowns, 3);
}

#[tokio::test]
async fn quitting_a_match_returns_to_ready() {
    let mut m = started(&abcd());
    let mut runner = ScriptedRunner::new(vec![None, Some(MatchScore::new(11, 2))]);

    assert!(m.play_next_match(&mut runner).await.unwrap().is_none());
    assert_eq!(m.state(), TournamentState::Ready);
    assert_eq!(runner.teardowns, 1);
    assert!(!m.bracket().unwrap().get_match("match1").unwrap().is_completed);

    let out = m.play_next_match(&mut runner).await.unwrap().unwrap();
    assert_eq!(out.completed.id, "match1");
    assert_eq!(runner.teardowns, 2);
}

#[tokio::test]
async fn tied_runner_result_cancels_the_match() {
    let mut m = started(&abcd());
    let mut runner = ScriptedRunner::new(vec![Some(MatchScore::new(5, 5))]);

    assert_eq!(
        m.play_next_match(&mut runner).await.unwrap_err(),
        TournamentError::InvalidResult
    );
    assert_eq!(m.state(), TournamentState::Ready);
    assert_eq!(runner.teardowns, 1);
    assert_eq!(m.current_match().unwrap().id, "match1");
}

#[tokio::test]
async fn simulated_runner_finishes_a_sixteen_player_bracket() {
    let entries: Vec<_> = (0..16)
        .map(|i| ParticipantEntry::ai(format!("Bot{i}")))
        .collect();
    let mut m = started(&entries);
    let mut runner = SimulatedRunner::with_seed(11, 42);

    let mut played = 0;
    while m.state() != TournamentState::Finished {
        m.play_next_match(&mut runner).await.unwrap().unwrap();
        played += 1;
    }
    assert_eq!(played, 15);

    let bracket = m.bracket().unwrap();
    for game in bracket.matches() {
        let s = game.score.unwrap();
        assert_ne!(s.player1, s.player2);
        assert_eq!(s.player1.max(s.player2), 11);
    }
    assert_eq!(bracket.participants().iter().filter(|p| !p.is_eliminated).count(), 1);
    assert!(m.champion().is_some());
}
