//! Tournament business logic: standings, pairing, recording, round control.

mod controller;
mod decider;
mod pairing;
mod recorder;
mod standings;

pub use controller::{run_tournament, RoundController, RoundReport, TournamentReport};
pub use decider::{CoinFlip, HigherSeedWins, MatchDecider, ScriptedDecider};
pub use pairing::pair;
pub use recorder::record;
pub use standings::standings;
