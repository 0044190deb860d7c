//! Roster storage: the narrow interface the tournament core reads and writes through.

mod csv_file;
mod memory;

pub use csv_file::{
    append_tournament_record, read_roster_names, read_tournament_records, write_standings_csv,
    CsvRosterStore,
};
pub use memory::{InMemoryRosterStore, RegisteredPlayer};

use crate::models::{PlayerId, StandingsRow, TournamentError};

/// Durable mapping of enrolled players to their accumulated wins/matches.
///
/// Every method is individually atomic. The core never assumes isolation across calls.
pub trait RosterStore {
    /// Number of players enrolled in the current tournament.
    fn count(&self) -> Result<usize, TournamentError>;

    /// Every enrolled player with counters, in store order (unsorted).
    fn list_with_stats(&self) -> Result<Vec<StandingsRow>, TournamentError>;

    /// Apply one match outcome: winner gets a win and a match, loser gets a match.
    /// Nothing is committed unless both players exist and differ.
    fn apply_result(&mut self, winner: PlayerId, loser: PlayerId) -> Result<(), TournamentError>;

    /// Clear match history and zero the counters of every enrolled player.
    fn reset(&mut self) -> Result<(), TournamentError>;
}

/// Registration side of a store, used by the presentation layer between tournaments.
pub trait PlayerRegistry: RosterStore {
    /// Create a new identity and enroll it. Returns the assigned id.
    fn register_player(&mut self, name: &str) -> Result<PlayerId, TournamentError>;

    /// Enroll a previously registered identity again.
    fn enroll_existing(&mut self, id: PlayerId) -> Result<(), TournamentError>;

    /// Remove every enrolled player. Registered identities are kept.
    fn clear_roster(&mut self) -> Result<(), TournamentError>;

    /// Register every name in order, all or nothing.
    ///
    /// Names are checked before any is registered. Stores whose writes can fail should
    /// override this to commit the batch as one unit.
    fn register_all(&mut self, names: &[String]) -> Result<Vec<PlayerId>, TournamentError> {
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(TournamentError::EmptyName);
        }
        names
            .iter()
            .map(|name| self.register_player(name))
            .collect()
    }
}

/// Register a whole roster. On failure no player from `names` is enrolled.
pub fn import_roster<S: PlayerRegistry + ?Sized>(
    store: &mut S,
    names: &[String],
) -> Result<Vec<PlayerId>, TournamentError> {
    let ids = store.register_all(names)?;
    log::debug!("Imported {} player(s)", ids.len());
    Ok(ids)
}
