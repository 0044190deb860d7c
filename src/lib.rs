//! Swiss-system tournament: library with models, roster stores, and round logic.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    pair, record, run_tournament, standings, CoinFlip, HigherSeedWins, MatchDecider,
    RoundController, RoundReport, ScriptedDecider, TournamentReport,
};
pub use models::{
    MatchResult, Pairing, Player, PlayerId, RoundPlan, StandingsRow, TournamentError,
    TournamentId, TournamentOutcome, TournamentRecord, TournamentState, ROUND_TABLE,
};
pub use store::{
    append_tournament_record, import_roster, read_roster_names, read_tournament_records,
    write_standings_csv, CsvRosterStore, InMemoryRosterStore,
    PlayerRegistry, RegisteredPlayer, RosterStore,
};
