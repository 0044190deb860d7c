//! Match recording: apply one reported outcome to the roster.

use crate::models::{MatchResult, TournamentError};
use crate::store::RosterStore;

/// Record a match. Winner gets a win and a match, loser gets a match.
///
/// Not idempotent: recording the same result twice counts two matches.
pub fn record<S: RosterStore + ?Sized>(store: &mut S, result: MatchResult) -> Result<(), TournamentError> {
    if result.winner == result.loser {
        return Err(TournamentError::SelfMatch(result.winner));
    }
    store.apply_result(result.winner, result.loser)
}
