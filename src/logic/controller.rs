//! Round controller: drives a tournament from setup to champion.

use crate::logic::decider::MatchDecider;
use crate::logic::pairing::pair;
use crate::logic::recorder::record;
use crate::logic::standings::standings;
use crate::models::{
    MatchResult, Pairing, RoundPlan, StandingsRow, TournamentError, TournamentOutcome,
    TournamentState,
};
use crate::store::RosterStore;
use serde::{Deserialize, Serialize};

/// Pairings and results of one completed round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u32,
    pub pairings: Vec<Pairing>,
    pub results: Vec<MatchResult>,
}

/// Everything a finished tournament produced.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentReport {
    pub plan: RoundPlan,
    pub rounds: Vec<RoundReport>,
    pub outcome: TournamentOutcome,
    pub final_standings: Vec<StandingsRow>,
}

/// State machine: `Setup -> RoundInProgress(1..=total) -> Complete`, or `Failed`.
///
/// The controller holds no store handle; each call receives one. Rounds run strictly in
/// order and every result of round k is recorded before round k+1 reads standings.
#[derive(Clone, Debug, Default)]
pub struct RoundController {
    state: TournamentState,
    plan: Option<RoundPlan>,
    rounds: Vec<RoundReport>,
    outcome: Option<TournamentOutcome>,
    final_standings: Vec<StandingsRow>,
}

impl RoundController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TournamentState {
        self.state
    }

    pub fn plan(&self) -> Option<RoundPlan> {
        self.plan
    }

    pub fn rounds(&self) -> &[RoundReport] {
        &self.rounds
    }

    /// Champion, once the tournament is complete.
    pub fn outcome(&self) -> Option<&TournamentOutcome> {
        self.outcome.as_ref()
    }

    /// Standings read after the last round. Empty until complete.
    pub fn final_standings(&self) -> &[StandingsRow] {
        &self.final_standings
    }

    /// Fix the round count from the roster size and enter round 1.
    ///
    /// On an unsupported count the controller stays in `Setup` and nothing is paired.
    pub fn start<S: RosterStore + ?Sized>(&mut self, store: &S) -> Result<RoundPlan, TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let plan = RoundPlan::for_player_count(store.count()?)?;
        log::info!(
            "Starting tournament: {} players, {} round(s)",
            plan.player_count,
            plan.total_rounds
        );
        self.plan = Some(plan);
        self.state = TournamentState::RoundInProgress(1);
        Ok(plan)
    }

    /// Play the current round: pair, decide, and record every match.
    ///
    /// After the last round the champion is read from fresh standings and the state becomes
    /// `Complete`. Any failure moves the controller to `Failed`.
    pub fn play_round<S, D>(&mut self, store: &mut S, decider: &mut D) -> Result<RoundReport, TournamentError>
    where
        S: RosterStore + ?Sized,
        D: MatchDecider + ?Sized,
    {
        let round = match self.state {
            TournamentState::RoundInProgress(round) => round,
            _ => return Err(TournamentError::InvalidState),
        };
        let plan = self.plan.ok_or(TournamentError::InvalidState)?;

        let report = match play(plan, round, store, decider) {
            Ok(report) => report,
            Err(cause) => return Err(self.fail(round, cause)),
        };
        self.rounds.push(report.clone());

        if round < plan.total_rounds {
            self.state = TournamentState::RoundInProgress(round + 1);
            return Ok(report);
        }
        match finish(plan, &*store) {
            Ok((outcome, rows)) => {
                log::info!(
                    "Champion: {} (id {}) won {} of {} matches",
                    outcome.champion.name,
                    outcome.champion.id,
                    outcome.champion.wins,
                    outcome.champion.matches
                );
                self.outcome = Some(outcome);
                self.final_standings = rows;
                self.state = TournamentState::Complete;
                Ok(report)
            }
            Err(cause) => Err(self.fail(round, cause)),
        }
    }

    /// Start (if still in setup) and play every remaining round.
    pub fn run<S, D>(&mut self, store: &mut S, decider: &mut D) -> Result<TournamentReport, TournamentError>
    where
        S: RosterStore + ?Sized,
        D: MatchDecider + ?Sized,
    {
        if self.state == TournamentState::Setup {
            self.start(&*store)?;
        }
        while let TournamentState::RoundInProgress(_) = self.state {
            self.play_round(store, decider)?;
        }
        match (self.plan, &self.outcome) {
            (Some(plan), Some(outcome)) => Ok(TournamentReport {
                plan,
                rounds: self.rounds.clone(),
                outcome: outcome.clone(),
                final_standings: self.final_standings.clone(),
            }),
            _ => Err(TournamentError::InvalidState),
        }
    }

    fn fail(&mut self, round: u32, cause: TournamentError) -> TournamentError {
        log::warn!("Tournament halted in round {}: {}", round, cause);
        self.state = TournamentState::Failed;
        TournamentError::RoundFailed {
            round,
            cause: Box::new(cause),
        }
    }
}

/// Run a whole tournament on a fresh controller.
pub fn run_tournament<S, D>(store: &mut S, decider: &mut D) -> Result<TournamentReport, TournamentError>
where
    S: RosterStore + ?Sized,
    D: MatchDecider + ?Sized,
{
    RoundController::new().run(store, decider)
}

fn play<S, D>(plan: RoundPlan, round: u32, store: &mut S, decider: &mut D) -> Result<RoundReport, TournamentError>
where
    S: RosterStore + ?Sized,
    D: MatchDecider + ?Sized,
{
    let rows = standings(&*store)?;
    // Roster must not change once the round count is fixed.
    if rows.len() != plan.player_count {
        return Err(TournamentError::InvalidState);
    }
    let pairings = pair(&rows)?;
    log::info!(
        "Round {}/{}: {} pairing(s)",
        round,
        plan.total_rounds,
        pairings.len()
    );

    let mut results = Vec::with_capacity(plan.matches_per_round());
    for p in &pairings {
        let result = decider.decide(p);
        if result.winner != result.loser && !p.accepts(&result) {
            return Err(TournamentError::ResultOutsidePairing {
                winner: result.winner,
                loser: result.loser,
            });
        }
        record(store, result)?;
        log::debug!(
            "Round {}: {} beat {}",
            round,
            p.name_of(result.winner).unwrap_or_default(),
            p.name_of(result.loser).unwrap_or_default()
        );
        results.push(result);
    }
    Ok(RoundReport {
        round,
        pairings,
        results,
    })
}

fn finish<S: RosterStore + ?Sized>(
    plan: RoundPlan,
    store: &S,
) -> Result<(TournamentOutcome, Vec<StandingsRow>), TournamentError> {
    let rows = standings(store)?;
    let champion = rows.first().cloned().ok_or(TournamentError::InvalidState)?;
    Ok((
        TournamentOutcome {
            champion,
            rounds_played: plan.total_rounds,
        },
        rows,
    ))
}
