//! Pairing and MatchResult for one round.

use crate::models::player::{PlayerId, StandingsRow};
use serde::{Deserialize, Serialize};

/// Two players drawn against each other for one round.
/// `first` is the higher-ranked (or tied-and-earlier) player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub first_id: PlayerId,
    pub first_name: String,
    pub second_id: PlayerId,
    pub second_name: String,
}

impl Pairing {
    pub fn new(first: &StandingsRow, second: &StandingsRow) -> Self {
        Self {
            first_id: first.id,
            first_name: first.name.clone(),
            second_id: second.id,
            second_name: second.name.clone(),
        }
    }

    /// Name of the player with this id, if seated here.
    pub fn name_of(&self, id: PlayerId) -> Option<&str> {
        if id == self.first_id {
            Some(&self.first_name)
        } else if id == self.second_id {
            Some(&self.second_name)
        } else {
            None
        }
    }

    /// Result with the first seat winning.
    pub fn first_wins(&self) -> MatchResult {
        MatchResult::new(self.first_id, self.second_id)
    }

    /// Result with the second seat winning.
    pub fn second_wins(&self) -> MatchResult {
        MatchResult::new(self.second_id, self.first_id)
    }

    /// Whether `result` names exactly this pairing's two players.
    pub fn accepts(&self, result: &MatchResult) -> bool {
        *result == self.first_wins() || *result == self.second_wins()
    }
}

/// Outcome of a single match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: PlayerId,
    pub loser: PlayerId,
}

impl MatchResult {
    pub fn new(winner: PlayerId, loser: PlayerId) -> Self {
        Self { winner, loser }
    }
}
