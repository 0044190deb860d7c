//! Swiss pairing: adjacent players in the standings meet each other.

use crate::models::{Pairing, RoundPlan, StandingsRow, TournamentError};
use std::collections::HashSet;

/// Pair one round from ranked standings.
///
/// Walks the standings in order. Each unmatched player at position `i` meets the player at
/// position `i + 1` of the full standings. If that successor is missing, already matched, or
/// the same id, pairing fails with `InvalidPairingState` rather than guessing a repair.
/// No pairing history is consulted, so rematches across rounds are possible.
pub fn pair(standings: &[StandingsRow]) -> Result<Vec<Pairing>, TournamentError> {
    RoundPlan::for_player_count(standings.len())?;

    let mut matched = HashSet::new();
    let mut pairings = Vec::with_capacity(standings.len() / 2);
    for (position, row) in standings.iter().enumerate() {
        if matched.contains(&row.id) {
            continue;
        }
        let invalid = TournamentError::InvalidPairingState {
            position,
            player: row.id,
        };
        let competitor = match standings.get(position + 1) {
            Some(next) if next.id != row.id && !matched.contains(&next.id) => next,
            _ => return Err(invalid),
        };
        matched.insert(row.id);
        matched.insert(competitor.id);
        pairings.push(Pairing::new(row, competitor));
    }
    Ok(pairings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u32, wins: u32) -> StandingsRow {
        StandingsRow::new(id, format!("P{id}"), wins, 2)
    }

    #[test]
    fn duplicate_id_in_standings_is_rejected() {
        let rows = vec![row(1, 2), row(1, 2), row(3, 1), row(4, 1)];
        assert_eq!(
            pair(&rows),
            Err(TournamentError::InvalidPairingState { position: 0, player: 1 })
        );
    }

    #[test]
    fn consumed_successor_is_rejected() {
        // Player 2 appears twice, so position 2 finds its successor already matched.
        let rows = vec![row(1, 2), row(2, 2), row(3, 1), row(2, 1)];
        assert_eq!(
            pair(&rows),
            Err(TournamentError::InvalidPairingState { position: 2, player: 3 })
        );
    }

    #[test]
    fn odd_count_is_unsupported() {
        let rows = vec![row(1, 0), row(2, 0), row(3, 0)];
        assert_eq!(pair(&rows), Err(TournamentError::UnsupportedPlayerCount(3)));
    }

    #[test]
    fn two_players_make_one_pairing() {
        let p = pair(&[row(5, 0), row(9, 0)]).unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!((p[0].first_id, p[0].second_id), (5, 9));
    }
}
