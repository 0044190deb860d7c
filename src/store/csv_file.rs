//! CSV persistence: a file-backed roster store, tournament history, roster import, and
//! standings export.

use crate::models::{Player, PlayerId, StandingsRow, TournamentError, TournamentRecord};
use crate::store::memory::{InMemoryRosterStore, RegisteredPlayer};
use crate::store::{PlayerRegistry, RosterStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// One line of the store file.
#[derive(Debug, Serialize, Deserialize)]
struct PlayerRecord {
    id: PlayerId,
    name: String,
    enrolled: bool,
    wins: u32,
    matches: u32,
}

#[derive(Debug, Deserialize)]
struct NameRecord {
    name: String,
}

/// Roster store persisted to a single CSV file.
///
/// Every mutation rewrites the file (temp file, then rename). If the write fails the
/// in-memory change is rolled back and `StoreUnavailable` is returned. The match log is
/// not persisted; only identities, enrollment and counters are.
#[derive(Debug)]
pub struct CsvRosterStore {
    path: PathBuf,
    inner: InMemoryRosterStore,
}

impl CsvRosterStore {
    /// Open the store at `path`, loading it if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TournamentError> {
        let path = path.into();
        let inner = if path.exists() {
            load(&path)?
        } else {
            InMemoryRosterStore::new()
        };
        log::debug!(
            "Opened roster store {} with {} enrolled player(s)",
            path.display(),
            inner.players().len()
        );
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents, as last committed.
    pub fn snapshot(&self) -> &InMemoryRosterStore {
        &self.inner
    }

    /// Write the current contents even if nothing changed (creates the file for a new store).
    pub fn persist(&self) -> Result<(), TournamentError> {
        save(&self.path, &self.inner)
    }

    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut InMemoryRosterStore) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let before = self.inner.clone();
        let value = change(&mut self.inner)?;
        if let Err(e) = save(&self.path, &self.inner) {
            self.inner = before;
            return Err(e);
        }
        Ok(value)
    }
}

impl RosterStore for CsvRosterStore {
    fn count(&self) -> Result<usize, TournamentError> {
        self.inner.count()
    }

    fn list_with_stats(&self) -> Result<Vec<StandingsRow>, TournamentError> {
        self.inner.list_with_stats()
    }

    fn apply_result(&mut self, winner: PlayerId, loser: PlayerId) -> Result<(), TournamentError> {
        self.commit(|s| s.apply_result(winner, loser))
    }

    fn reset(&mut self) -> Result<(), TournamentError> {
        self.commit(|s| s.reset())
    }
}

impl PlayerRegistry for CsvRosterStore {
    fn register_player(&mut self, name: &str) -> Result<PlayerId, TournamentError> {
        self.commit(|s| s.register_player(name))
    }

    fn enroll_existing(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        self.commit(|s| s.enroll_existing(id))
    }

    fn clear_roster(&mut self) -> Result<(), TournamentError> {
        self.commit(|s| s.clear_roster())
    }

    fn register_all(&mut self, names: &[String]) -> Result<Vec<PlayerId>, TournamentError> {
        self.commit(|s| s.register_all(names))
    }
}

fn unavailable(path: &Path, e: impl std::fmt::Display) -> TournamentError {
    TournamentError::StoreUnavailable(format!("{}: {}", path.display(), e))
}

fn load(path: &Path) -> Result<InMemoryRosterStore, TournamentError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| unavailable(path, e))?;
    let mut registry = Vec::new();
    let mut roster = Vec::new();
    for record in reader.deserialize::<PlayerRecord>() {
        let r = record.map_err(|e| TournamentError::InvalidRoster(e.to_string()))?;
        if r.wins > r.matches {
            return Err(TournamentError::InvalidRoster(format!(
                "player {} has {} wins in {} matches",
                r.id, r.wins, r.matches
            )));
        }
        if registry.iter().any(|p: &RegisteredPlayer| p.id == r.id) {
            return Err(TournamentError::InvalidRoster(format!("duplicate id {}", r.id)));
        }
        registry.push(RegisteredPlayer {
            id: r.id,
            name: r.name.clone(),
        });
        if r.enrolled {
            roster.push(Player {
                id: r.id,
                name: r.name,
                wins: r.wins,
                matches: r.matches,
            });
        }
    }
    Ok(InMemoryRosterStore::from_parts(registry, roster))
}

fn save(path: &Path, store: &InMemoryRosterStore) -> Result<(), TournamentError> {
    let tmp = path.with_extension("csv.tmp");
    let written = write_records(&tmp, store)
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| unavailable(path, e)));
    if written.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            log::warn!("Could not remove {}: {}", tmp.display(), e);
        }
    }
    written?;
    log::debug!("Saved roster store {}", path.display());
    Ok(())
}

fn write_records(tmp: &Path, store: &InMemoryRosterStore) -> Result<(), TournamentError> {
    let mut writer = csv::Writer::from_path(tmp).map_err(|e| unavailable(tmp, e))?;
    // Enrolled players first, so store order survives a reload.
    let enrolled = store.players().iter().map(|p| PlayerRecord {
        id: p.id,
        name: p.name.clone(),
        enrolled: true,
        wins: p.wins,
        matches: p.matches,
    });
    let idle = store
        .registry()
        .iter()
        .filter(|r| store.player(r.id).is_none())
        .map(|r| PlayerRecord {
            id: r.id,
            name: r.name.clone(),
            enrolled: false,
            wins: 0,
            matches: 0,
        });
    for record in enrolled.chain(idle) {
        writer.serialize(&record).map_err(|e| unavailable(tmp, e))?;
    }
    writer.flush().map_err(|e| unavailable(tmp, e))
}

/// Read player names from CSV with a `name` header column.
pub fn read_roster_names<R: Read>(input: R) -> Result<Vec<String>, TournamentError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    reader
        .deserialize::<NameRecord>()
        .map(|r| {
            r.map(|n| n.name)
                .map_err(|e| TournamentError::InvalidRoster(e.to_string()))
        })
        .collect()
}

/// Append one completion record to a CSV history file, writing the header on first use.
pub fn append_tournament_record(path: &Path, record: &TournamentRecord) -> Result<(), TournamentError> {
    let fresh = !path.exists();
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| unavailable(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(fresh)
        .from_writer(file);
    writer.serialize(record).map_err(|e| unavailable(path, e))?;
    writer.flush().map_err(|e| unavailable(path, e))
}

/// Completion records from a CSV history file, oldest first. A missing file means no history.
pub fn read_tournament_records(path: &Path) -> Result<Vec<TournamentRecord>, TournamentError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| unavailable(path, e))?;
    reader
        .deserialize::<TournamentRecord>()
        .map(|r| r.map_err(|e| TournamentError::InvalidRoster(e.to_string())))
        .collect()
}

/// Write standings as CSV: `id,name,wins,matches`.
pub fn write_standings_csv<W: Write>(out: W, rows: &[StandingsRow]) -> Result<(), TournamentError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| TournamentError::StoreUnavailable(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| TournamentError::StoreUnavailable(e.to_string()))
}
