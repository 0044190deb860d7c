//! Integration tests for running whole tournaments through the round controller.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use swiss_tournament_web::{
    record, run_tournament, standings, CoinFlip, CsvRosterStore, HigherSeedWins,
    InMemoryRosterStore, MatchResult, PlayerId, PlayerRegistry, RoundController, RosterStore,
    ScriptedDecider, StandingsRow, TournamentError, TournamentState, ROUND_TABLE,
};
use uuid::Uuid;

fn store_with_players(n: usize) -> InMemoryRosterStore {
    let mut store = InMemoryRosterStore::new();
    for i in 0..n {
        store.register_player(&format!("Player {i}")).unwrap();
    }
    store
}

fn totals(store: &InMemoryRosterStore) -> (u32, u32) {
    store
        .players()
        .iter()
        .fold((0, 0), |(w, m), p| (w + p.wins, m + p.matches))
}

/// Store that goes offline after a number of successful standings reads.
struct OfflineAfter {
    inner: InMemoryRosterStore,
    reads_left: usize,
}

impl OfflineAfter {
    fn check(&self) -> Result<(), TournamentError> {
        if self.reads_left == 0 {
            return Err(TournamentError::StoreUnavailable("connection lost".into()));
        }
        Ok(())
    }
}

impl RosterStore for OfflineAfter {
    fn count(&self) -> Result<usize, TournamentError> {
        self.inner.count()
    }

    fn list_with_stats(&self) -> Result<Vec<StandingsRow>, TournamentError> {
        self.check()?;
        self.inner.list_with_stats()
    }

    fn apply_result(&mut self, winner: PlayerId, loser: PlayerId) -> Result<(), TournamentError> {
        self.inner.apply_result(winner, loser)?;
        // Each round reads standings once; the read budget shrinks after its last match.
        if self.inner.history().len() % 2 == 0 {
            self.reads_left = self.reads_left.saturating_sub(1);
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<(), TournamentError> {
        self.inner.reset()
    }
}

#[test]
fn four_players_play_two_rounds() {
    let mut store = store_with_players(4);
    let mut coin = CoinFlip::with_rng(StdRng::seed_from_u64(42));
    let report = run_tournament(&mut store, &mut coin).unwrap();

    assert_eq!(report.plan.total_rounds, 2);
    assert_eq!(report.rounds.len(), 2);
    assert_eq!(totals(&store), (4, 8));
    assert!(store.players().iter().all(|p| p.matches == 2));
    assert_eq!(report.outcome.champion, report.final_standings[0]);
    assert_eq!(report.outcome.rounds_played, 2);
}

#[test]
fn match_count_grows_by_one_round_at_a_time() {
    for &(n, total) in ROUND_TABLE.iter() {
        let mut store = store_with_players(n);
        let mut coin = CoinFlip::with_rng(StdRng::seed_from_u64(n as u64));
        let mut controller = RoundController::new();
        controller.start(&store).unwrap();
        for k in 1..=total {
            let report = controller.play_round(&mut store, &mut coin).unwrap();
            assert_eq!(report.round, k);
            let (wins, matches) = totals(&store);
            assert_eq!(matches as usize, 2 * k as usize * (n / 2));
            assert_eq!(wins as usize, k as usize * (n / 2));
        }
        assert_eq!(controller.state(), TournamentState::Complete);
        let champion = &controller.outcome().unwrap().champion;
        let best = store.players().iter().map(|p| p.wins).max().unwrap();
        assert_eq!(champion.wins, best);
    }
}

#[test]
fn odd_roster_never_starts() {
    let mut store = store_with_players(5);
    let mut decider = ScriptedDecider::default();
    let err = run_tournament(&mut store, &mut decider).unwrap_err();
    assert_eq!(err, TournamentError::UnsupportedPlayerCount(5));
    assert!(store.history().is_empty());
    assert!(store.players().iter().all(|p| p.matches == 0));

    let mut controller = RoundController::new();
    assert!(controller.start(&store).is_err());
    assert_eq!(controller.state(), TournamentState::Setup);
}

#[test]
fn self_match_is_rejected_without_changes() {
    let mut store = InMemoryRosterStore::new();
    for name in ["A", "B", "C", "D", "E", "F", "G"] {
        store.register_player(name).unwrap();
    }
    assert_eq!(store.apply_result(7, 7), Err(TournamentError::SelfMatch(7)));
    assert_eq!(record(&mut store, MatchResult::new(7, 7)), Err(TournamentError::SelfMatch(7)));
    assert_eq!(
        store.list_with_stats().unwrap()[6],
        StandingsRow::new(7, "G", 0, 0)
    );
}

#[test]
fn self_match_from_decider_halts_the_round() {
    let mut store = store_with_players(4);
    let mut decider = ScriptedDecider::new([MatchResult::new(1, 2), MatchResult::new(3, 3)]);
    let mut controller = RoundController::new();
    let err = controller.run(&mut store, &mut decider).unwrap_err();
    assert_eq!(
        err,
        TournamentError::RoundFailed {
            round: 1,
            cause: Box::new(TournamentError::SelfMatch(3)),
        }
    );
    assert_eq!(controller.state(), TournamentState::Failed);
    // First match stays recorded; no partial-round rollback.
    assert_eq!(store.history(), &[MatchResult::new(1, 2)]);
    assert!(controller.run(&mut store, &mut decider).is_err());
}

#[test]
fn rematches_are_possible() {
    let mut store = store_with_players(6);
    let report = run_tournament(&mut store, &mut HigherSeedWins).unwrap();
    let pairs: Vec<Vec<(u32, u32)>> = report
        .rounds
        .iter()
        .map(|r| r.pairings.iter().map(|p| (p.first_id, p.second_id)).collect())
        .collect();
    assert_eq!(pairs[0], vec![(1, 2), (3, 4), (5, 6)]);
    assert_eq!(pairs[1], vec![(1, 3), (5, 2), (4, 6)]);
    // 3 and 4 meet again: no pairing history is consulted.
    assert_eq!(pairs[2], vec![(1, 5), (3, 4), (2, 6)]);
    assert_eq!(report.outcome.champion, StandingsRow::new(1, "Player 0", 3, 3));
}

#[test]
fn store_can_host_another_tournament_after_reset() {
    let mut store = store_with_players(2);
    run_tournament(&mut store, &mut HigherSeedWins).unwrap();
    store.reset().unwrap();
    store.clear_roster().unwrap();

    store.enroll_existing(2).unwrap();
    store.enroll_existing(1).unwrap();
    let report = run_tournament(&mut store, &mut HigherSeedWins).unwrap();
    assert_eq!(report.outcome.champion.id, 2);
    assert_eq!(report.outcome.champion.matches, 1);
}

#[test]
fn unavailable_store_surfaces_from_standings() {
    let store = OfflineAfter {
        inner: store_with_players(4),
        reads_left: 0,
    };
    assert_eq!(
        standings(&store),
        Err(TournamentError::StoreUnavailable("connection lost".into()))
    );
}

#[test]
fn store_going_offline_between_rounds_fails_the_tournament() {
    let mut store = OfflineAfter {
        inner: store_with_players(4),
        reads_left: 1,
    };
    let mut controller = RoundController::new();
    let err = controller.run(&mut store, &mut HigherSeedWins).unwrap_err();
    assert_eq!(
        err,
        TournamentError::RoundFailed {
            round: 2,
            cause: Box::new(TournamentError::StoreUnavailable("connection lost".into())),
        }
    );
    assert_eq!(controller.state(), TournamentState::Failed);
    assert_eq!(controller.rounds().len(), 1);
    // Round 1 stays recorded and nothing from round 2 was applied.
    assert_eq!(store.inner.history().len(), 2);
}

#[test]
fn losing_the_data_directory_mid_tournament_fails_the_round() {
    let dir = std::env::temp_dir().join(format!("swiss-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    let mut store = CsvRosterStore::open(dir.join("roster.csv")).unwrap();
    for name in ["A", "B", "C", "D"] {
        store.register_player(name).unwrap();
    }
    let mut controller = RoundController::new();
    controller.start(&store).unwrap();
    controller.play_round(&mut store, &mut HigherSeedWins).unwrap();

    fs::remove_dir_all(&dir).unwrap();
    let err = controller
        .play_round(&mut store, &mut HigherSeedWins)
        .unwrap_err();
    match err {
        TournamentError::RoundFailed { round, cause } => {
            assert_eq!(round, 2);
            assert!(matches!(*cause, TournamentError::StoreUnavailable(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(controller.state(), TournamentState::Failed);
    // The failed write was rolled back: counters still show one round.
    assert!(store.snapshot().players().iter().all(|p| p.matches == 1));
}
