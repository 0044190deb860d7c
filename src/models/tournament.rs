//! Tournament state, round plan, outcome, and errors.

use crate::models::player::{PlayerId, StandingsRow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// The roster store could not be read or written.
    StoreUnavailable(String),
    /// Player count has no entry in the round table.
    UnsupportedPlayerCount(usize),
    /// Player id is not on the roster (or was never registered).
    UnknownPlayer(PlayerId),
    /// Winner and loser are the same player.
    SelfMatch(PlayerId),
    /// Adjacent pairing hit a successor that is missing or already matched.
    InvalidPairingState { position: usize, player: PlayerId },
    /// A decided result does not name exactly the pairing's two players.
    ResultOutsidePairing { winner: PlayerId, loser: PlayerId },
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// A round aborted; the tournament is halted.
    RoundFailed { round: u32, cause: Box<TournamentError> },
    /// Player name is empty after trimming.
    EmptyName,
    /// Player is already enrolled in the current tournament.
    AlreadyEnrolled(PlayerId),
    /// Roster input could not be parsed.
    InvalidRoster(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::StoreUnavailable(msg) => write!(f, "Roster store unavailable: {}", msg),
            TournamentError::UnsupportedPlayerCount(n) => write!(
                f,
                "Unsupported player count {} (need an even count from 2 to 16)",
                n
            ),
            TournamentError::UnknownPlayer(id) => write!(f, "Unknown player {}", id),
            TournamentError::SelfMatch(id) => write!(f, "Player {} cannot play against themselves", id),
            TournamentError::InvalidPairingState { position, player } => write!(
                f,
                "Cannot pair player {} at standings position {}: successor missing or already matched",
                player, position
            ),
            TournamentError::ResultOutsidePairing { winner, loser } => {
                write!(f, "Result {} beat {} does not match the pairing", winner, loser)
            }
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::RoundFailed { round, cause } => write!(f, "Round {} failed: {}", round, cause),
            TournamentError::EmptyName => write!(f, "Player name must not be empty"),
            TournamentError::AlreadyEnrolled(id) => write!(f, "Player {} is already enrolled", id),
            TournamentError::InvalidRoster(msg) => write!(f, "Invalid roster: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TournamentError::RoundFailed { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl TournamentError {
    /// Innermost error, looking through `RoundFailed`.
    pub fn root_cause(&self) -> &TournamentError {
        match self {
            TournamentError::RoundFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

/// Unique identifier for a tournament session or completion record.
pub type TournamentId = Uuid;

/// Player count to number of rounds.
pub const ROUND_TABLE: [(usize, u32); 8] = [
    (2, 1),
    (4, 2),
    (6, 3),
    (8, 3),
    (10, 4),
    (12, 4),
    (14, 4),
    (16, 4),
];

/// Rounds to play for a given roster size.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundPlan {
    pub player_count: usize,
    pub total_rounds: u32,
}

impl RoundPlan {
    /// Look up the round count; counts outside the table are rejected.
    pub fn for_player_count(player_count: usize) -> Result<Self, TournamentError> {
        ROUND_TABLE
            .iter()
            .find(|(count, _)| *count == player_count)
            .map(|&(_, total_rounds)| Self {
                player_count,
                total_rounds,
            })
            .ok_or(TournamentError::UnsupportedPlayerCount(player_count))
    }

    /// Matches played in one round.
    pub fn matches_per_round(&self) -> usize {
        self.player_count / 2
    }
}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Roster being finalized; no rounds played.
    #[default]
    Setup,
    /// Round `n` (1-based) is next to be played.
    RoundInProgress(u32),
    /// All rounds recorded; champion known.
    Complete,
    /// A round aborted. Terminal.
    Failed,
}

/// Champion after the final round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentOutcome {
    pub champion: StandingsRow,
    pub rounds_played: u32,
}

/// Completion record kept by the presentation layer after each tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub id: TournamentId,
    pub winner_id: PlayerId,
    pub winner_name: String,
    pub wins: u32,
    pub matches: u32,
    pub rounds: u32,
    pub completed_at: DateTime<Utc>,
}

impl TournamentRecord {
    pub fn from_outcome(outcome: &TournamentOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            winner_id: outcome.champion.id,
            winner_name: outcome.champion.name.clone(),
            wins: outcome.champion.wins,
            matches: outcome.champion.matches,
            rounds: outcome.rounds_played,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_table_lookup() {
        let rounds: Vec<u32> = [2, 4, 6, 8, 10, 12, 14, 16]
            .iter()
            .map(|&n| RoundPlan::for_player_count(n).unwrap().total_rounds)
            .collect();
        assert_eq!(rounds, vec![1, 2, 3, 3, 4, 4, 4, 4]);
    }

    #[test]
    fn counts_outside_table_are_rejected() {
        for n in [0, 1, 3, 5, 15, 18] {
            assert_eq!(
                RoundPlan::for_player_count(n),
                Err(TournamentError::UnsupportedPlayerCount(n))
            );
        }
    }

    #[test]
    fn root_cause_unwraps_round_failure() {
        let err = TournamentError::RoundFailed {
            round: 2,
            cause: Box::new(TournamentError::UnknownPlayer(9)),
        };
        assert_eq!(err.root_cause(), &TournamentError::UnknownPlayer(9));
        assert_eq!(err.to_string(), "Round 2 failed: Unknown player 9");
    }

    #[test]
    fn record_copies_champion() {
        let outcome = TournamentOutcome {
            champion: StandingsRow::new(3, "Ada", 2, 2),
            rounds_played: 2,
        };
        let record = TournamentRecord::from_outcome(&outcome);
        assert_eq!((record.winner_id, record.wins, record.matches), (3, 2, 2));
        assert_eq!(record.winner_name, "Ada");
        assert_eq!(record.rounds, 2);
    }
}
