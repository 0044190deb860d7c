//! Player and StandingsRow data structures.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player. Assigned by the roster store at registration and never reused.
pub type PlayerId = u32;

/// A player enrolled in the current tournament, with accumulated counters.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub matches: u32,
}

impl Player {
    /// Create a new player with the given id and name. Counters start at zero.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            wins: 0,
            matches: 0,
        }
    }

    /// Record a win (one more match played, one more won).
    pub fn add_win(&mut self) {
        self.wins += 1;
        self.matches += 1;
    }

    /// Record a loss (one more match played).
    pub fn add_loss(&mut self) {
        self.matches += 1;
    }

    /// Zero both counters.
    pub fn reset(&mut self) {
        self.wins = 0;
        self.matches = 0;
    }

    /// Read-only projection used by the standings.
    pub fn row(&self) -> StandingsRow {
        StandingsRow {
            id: self.id,
            name: self.name.clone(),
            wins: self.wins,
            matches: self.matches,
        }
    }
}

/// One line of the standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub matches: u32,
}

impl StandingsRow {
    pub fn new(id: PlayerId, name: impl Into<String>, wins: u32, matches: u32) -> Self {
        Self {
            id,
            name: name.into(),
            wins,
            matches,
        }
    }
}
