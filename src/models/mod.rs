//! Data structures for the Swiss tournament: players, pairings, tournament state.

mod pairing;
mod player;
mod tournament;

pub use pairing::{MatchResult, Pairing};
pub use player::{Player, PlayerId, StandingsRow};
pub use tournament::{
    RoundPlan, TournamentError, TournamentId, TournamentOutcome, TournamentRecord, TournamentState,
    ROUND_TABLE,
};
