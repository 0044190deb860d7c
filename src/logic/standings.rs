//! Standings: ranked view of the roster.

use crate::models::{StandingsRow, TournamentError};
use crate::store::RosterStore;

/// Enrolled players sorted by wins, most first. Ties keep store order.
pub fn standings<S: RosterStore + ?Sized>(store: &S) -> Result<Vec<StandingsRow>, TournamentError> {
    let mut rows = store.list_with_stats()?;
    // sort_by is stable
    rows.sort_by(|a, b| b.wins.cmp(&a.wins));
    Ok(rows)
}
