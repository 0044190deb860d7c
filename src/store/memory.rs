//! In-process roster store.

use crate::models::{MatchResult, Player, PlayerId, StandingsRow, TournamentError};
use crate::store::{PlayerRegistry, RosterStore};
use serde::{Deserialize, Serialize};

/// An identity known to the store, enrolled or not.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RegisteredPlayer {
    pub id: PlayerId,
    pub name: String,
}

/// Roster kept in memory: registry of identities, enrolled players, match log.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InMemoryRosterStore {
    /// Every identity ever registered. Never shrinks, so ids are never reused.
    registry: Vec<RegisteredPlayer>,
    /// Enrolled players, in enrollment order.
    roster: Vec<Player>,
    /// Results applied since the last reset.
    history: Vec<MatchResult>,
    last_id: PlayerId,
}

impl InMemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with players and counters, enrolled in the given order.
    pub fn with_players(players: Vec<Player>) -> Self {
        let registry = players
            .iter()
            .map(|p| RegisteredPlayer {
                id: p.id,
                name: p.name.clone(),
            })
            .collect();
        Self::from_parts(registry, players)
    }

    pub(crate) fn from_parts(registry: Vec<RegisteredPlayer>, roster: Vec<Player>) -> Self {
        let last_id = registry.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            registry,
            roster,
            history: Vec::new(),
            last_id,
        }
    }

    /// Enrolled players with counters.
    pub fn players(&self) -> &[Player] {
        &self.roster
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.iter().find(|p| p.id == id)
    }

    pub fn registry(&self) -> &[RegisteredPlayer] {
        &self.registry
    }

    /// Results applied since the last reset, oldest first.
    pub fn history(&self) -> &[MatchResult] {
        &self.history
    }

    fn position(&self, id: PlayerId) -> Result<usize, TournamentError> {
        self.roster
            .iter()
            .position(|p| p.id == id)
            .ok_or(TournamentError::UnknownPlayer(id))
    }
}

impl RosterStore for InMemoryRosterStore {
    fn count(&self) -> Result<usize, TournamentError> {
        Ok(self.roster.len())
    }

    fn list_with_stats(&self) -> Result<Vec<StandingsRow>, TournamentError> {
        Ok(self.roster.iter().map(Player::row).collect())
    }

    fn apply_result(&mut self, winner: PlayerId, loser: PlayerId) -> Result<(), TournamentError> {
        if winner == loser {
            return Err(TournamentError::SelfMatch(winner));
        }
        // Resolve both before touching either.
        let w = self.position(winner)?;
        let l = self.position(loser)?;
        self.roster[w].add_win();
        self.roster[l].add_loss();
        self.history.push(MatchResult::new(winner, loser));
        Ok(())
    }

    fn reset(&mut self) -> Result<(), TournamentError> {
        for p in &mut self.roster {
            p.reset();
        }
        self.history.clear();
        log::debug!("Reset counters for {} player(s)", self.roster.len());
        Ok(())
    }
}

impl PlayerRegistry for InMemoryRosterStore {
    fn register_player(&mut self, name: &str) -> Result<PlayerId, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        self.last_id += 1;
        let id = self.last_id;
        self.registry.push(RegisteredPlayer {
            id,
            name: name.to_string(),
        });
        self.roster.push(Player::new(id, name));
        Ok(id)
    }

    fn enroll_existing(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        if self.roster.iter().any(|p| p.id == id) {
            return Err(TournamentError::AlreadyEnrolled(id));
        }
        let known = self
            .registry
            .iter()
            .find(|r| r.id == id)
            .ok_or(TournamentError::UnknownPlayer(id))?;
        self.roster.push(Player::new(id, known.name.clone()));
        Ok(())
    }

    fn clear_roster(&mut self) -> Result<(), TournamentError> {
        self.roster.clear();
        self.history.clear();
        Ok(())
    }
}
