//! Single binary web server: JSON API over tournament sessions.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, SESSION_TIMEOUT_HOURS, ROSTER_CSV (file with a `name` column
//! preloaded into every new session), DATA_DIR (keep each session's roster and tournament
//! history as CSV files there, so registered players and past results survive a restart).

use actix_web::{
    delete, get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use swiss_tournament_web::{
    append_tournament_record, import_roster, pair, read_roster_names, read_tournament_records,
    record, run_tournament, standings, write_standings_csv, CoinFlip, CsvRosterStore,
    InMemoryRosterStore, MatchDecider, MatchResult, PlayerId, PlayerRegistry, RegisteredPlayer,
    StandingsRow, TournamentError, TournamentId, TournamentRecord, TournamentReport,
};
use uuid::Uuid;

/// Where a session's roster lives.
enum SessionStore {
    Memory(InMemoryRosterStore),
    Durable(CsvRosterStore),
}

impl SessionStore {
    fn contents(&self) -> &InMemoryRosterStore {
        match self {
            SessionStore::Memory(store) => store,
            SessionStore::Durable(store) => store.snapshot(),
        }
    }

    fn registry_mut(&mut self) -> &mut dyn PlayerRegistry {
        match self {
            SessionStore::Memory(store) => store,
            SessionStore::Durable(store) => store,
        }
    }
}

/// One tournament session: roster store, completion records, and last activity time.
struct Session {
    store: SessionStore,
    history: Vec<TournamentRecord>,
    /// Set when the session is kept under DATA_DIR.
    history_path: Option<PathBuf>,
    last_activity: Instant,
}

impl Session {
    /// New session, on disk if DATA_DIR is set, preloaded with the configured roster.
    fn create(id: TournamentId, config: &Config) -> Result<Self, TournamentError> {
        let (store, history_path) = match &config.data_dir {
            Some(dir) => {
                let store = CsvRosterStore::open(roster_file(dir, id))?;
                store.persist()?;
                (SessionStore::Durable(store), Some(history_file(dir, id)))
            }
            None => (SessionStore::Memory(InMemoryRosterStore::new()), None),
        };
        let mut session = Self {
            store,
            history: Vec::new(),
            history_path,
            last_activity: Instant::now(),
        };
        import_roster(session.store.registry_mut(), &config.preload)?;
        Ok(session)
    }

    /// Reopen a session kept under `dir`. `None` if it was never created there.
    fn restore(id: TournamentId, dir: &std::path::Path) -> Result<Option<Self>, TournamentError> {
        let roster = roster_file(dir, id);
        if !roster.exists() {
            return Ok(None);
        }
        let history_path = history_file(dir, id);
        let history = read_tournament_records(&history_path)?;
        log::info!("Restored tournament session {} from {}", id, dir.display());
        Ok(Some(Self {
            store: SessionStore::Durable(CsvRosterStore::open(roster)?),
            history,
            history_path: Some(history_path),
            last_activity: Instant::now(),
        }))
    }

    /// Run a whole tournament, keep its completion record, then reset counters and clear
    /// the roster for the next tournament.
    fn run<D: MatchDecider + ?Sized>(&mut self, decider: &mut D) -> Result<RunResponse, TournamentError> {
        let report = run_tournament(self.store.registry_mut(), decider)?;
        let record = TournamentRecord::from_outcome(&report.outcome);
        log::info!(
            "Tournament {} won by {} (id {})",
            record.id,
            record.winner_name,
            record.winner_id
        );
        if let Some(path) = &self.history_path {
            append_tournament_record(path, &record)?;
        }
        self.history.push(record.clone());
        let store = self.store.registry_mut();
        store.reset().and_then(|()| store.clear_roster())?;
        Ok(RunResponse { record, report })
    }
}

fn roster_file(dir: &std::path::Path, id: TournamentId) -> PathBuf {
    dir.join(format!("{id}.roster.csv"))
}

fn history_file(dir: &std::path::Path, id: TournamentId) -> PathBuf {
    dir.join(format!("{id}.tournaments.csv"))
}

/// In-memory state: sessions by id. Entries are removed after inactivity; sessions under
/// DATA_DIR are reopened from disk on their next request.
type AppState = Data<RwLock<HashMap<TournamentId, Session>>>;

/// Settings read from the environment at startup.
#[derive(Clone, Debug)]
struct Config {
    host: String,
    port: u16,
    session_timeout: Duration,
    preload: Vec<String>,
    data_dir: Option<PathBuf>,
}

impl Config {
    fn from_env() -> std::io::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let hours: u64 = std::env::var("SESSION_TIMEOUT_HOURS")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(12);
        let preload = match std::env::var("ROSTER_CSV") {
            Ok(path) => {
                let file = std::fs::File::open(&path)?;
                let names = read_roster_names(file)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                log::info!("Loaded {} player name(s) from {}", names.len(), path);
                names
            }
            Err(_) => Vec::new(),
        };
        let data_dir = match std::env::var("DATA_DIR") {
            Ok(dir) => {
                let dir = PathBuf::from(dir);
                std::fs::create_dir_all(&dir)?;
                log::info!("Keeping tournament data in {}", dir.display());
                Some(dir)
            }
            Err(_) => None,
        };
        Ok(Self {
            host,
            port,
            session_timeout: session_timeout(hours),
            preload,
            data_dir,
        })
    }
}

fn session_timeout(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Session as returned by the API.
#[derive(Serialize)]
struct SessionView<'a> {
    id: TournamentId,
    standings: Vec<StandingsRow>,
    registry: &'a [RegisteredPlayer],
    history: &'a [TournamentRecord],
}

#[derive(Serialize)]
struct RunResponse {
    record: TournamentRecord,
    report: TournamentReport,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct ReportMatchBody {
    winner_id: PlayerId,
    loser_id: PlayerId,
}

#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

fn error_response(e: TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn view(id: TournamentId, session: &Session) -> HttpResponse {
    let contents = session.store.contents();
    match standings(contents) {
        Ok(rows) => HttpResponse::Ok().json(SessionView {
            id,
            standings: rows,
            registry: contents.registry(),
            history: &session.history,
        }),
        Err(e) => error_response(e),
    }
}

/// Look up a session (reopening it from DATA_DIR if needed), refresh its activity time,
/// and hand it to `f`.
fn with_session<F>(state: &AppState, config: &Config, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Session) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if !g.contains_key(&id) {
        if let Some(dir) = &config.data_dir {
            match Session::restore(id, dir) {
                Ok(Some(session)) => {
                    g.insert(id, session);
                }
                Ok(None) => {}
                Err(e) => return error_response(e),
            }
        }
    }
    match g.get_mut(&id) {
        Some(session) => {
            session.last_activity = Instant::now();
            f(session)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "swiss-tournament-web",
    })
}

/// Create a session (preloaded from ROSTER_CSV if configured).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, config: Data<Config>) -> HttpResponse {
    let id = Uuid::new_v4();
    let session = match Session::create(id, &config) {
        Ok(session) => session,
        Err(e) => return error_response(e),
    };
    let response = view(id, &session);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(id, session);
    log::info!("Created tournament session {}", id);
    response
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, config: Data<Config>, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_session(&state, &config, id, |s| view(id, s))
}

/// Register a new player and enroll them.
#[post("/api/tournaments/{id}/players")]
async fn api_add_player(state: AppState, config: Data<Config>, path: Path<TournamentPath>, body: Json<AddPlayerBody>) -> HttpResponse {
    let id = path.id;
    with_session(&state, &config, id, |s| match s.store.registry_mut().register_player(&body.name) {
        Ok(_) => view(id, s),
        Err(e) => error_response(e),
    })
}

/// Enroll a player registered in an earlier tournament.
#[post("/api/tournaments/{id}/players/{player_id}/enroll")]
async fn api_enroll_player(state: AppState, config: Data<Config>, path: Path<TournamentPlayerPath>) -> HttpResponse {
    let (id, player_id) = (path.id, path.player_id);
    with_session(&state, &config, id, |s| match s.store.registry_mut().enroll_existing(player_id) {
        Ok(()) => view(id, s),
        Err(e) => error_response(e),
    })
}

/// Remove every enrolled player (registered identities are kept).
#[delete("/api/tournaments/{id}/players")]
async fn api_clear_roster(state: AppState, config: Data<Config>, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    with_session(&state, &config, id, |s| match s.store.registry_mut().clear_roster() {
        Ok(()) => view(id, s),
        Err(e) => error_response(e),
    })
}

/// Register every name from a CSV body with a `name` header.
#[post("/api/tournaments/{id}/roster")]
async fn api_import_roster(state: AppState, config: Data<Config>, path: Path<TournamentPath>, body: String) -> HttpResponse {
    let id = path.id;
    let names = match read_roster_names(body.as_bytes()) {
        Ok(names) => names,
        Err(e) => return error_response(e),
    };
    with_session(&state, &config, id, |s| match import_roster(s.store.registry_mut(), &names) {
        Ok(_) => view(id, s),
        Err(e) => error_response(e),
    })
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, config: Data<Config>, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, &config, path.id, |s| match standings(s.store.contents()) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(e),
    })
}

#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, config: Data<Config>, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, &config, path.id, |s| {
        let mut out = Vec::new();
        match standings(s.store.contents()).and_then(|rows| write_standings_csv(&mut out, &rows)) {
            Ok(()) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(out),
            Err(e) => error_response(e),
        }
    })
}

/// Preview the pairings the next round would use.
#[get("/api/tournaments/{id}/pairings")]
async fn api_pairings(state: AppState, config: Data<Config>, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, &config, path.id, |s| {
        match standings(s.store.contents()).and_then(|rows| pair(&rows)) {
            Ok(pairings) => HttpResponse::Ok().json(pairings),
            Err(e) => error_response(e),
        }
    })
}

/// Report a single match result by hand.
#[post("/api/tournaments/{id}/matches")]
async fn api_report_match(state: AppState, config: Data<Config>, path: Path<TournamentPath>, body: Json<ReportMatchBody>) -> HttpResponse {
    let id = path.id;
    let result = MatchResult::new(body.winner_id, body.loser_id);
    with_session(&state, &config, id, |s| match record(s.store.registry_mut(), result) {
        Ok(()) => view(id, s),
        Err(e) => error_response(e),
    })
}

/// Run a whole tournament with coin-flip outcomes.
#[post("/api/tournaments/{id}/run")]
async fn api_run_tournament(state: AppState, config: Data<Config>, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, &config, path.id, |s| match s.run(&mut CoinFlip::new()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(e),
    })
}

#[get("/api/tournaments/{id}/history")]
async fn api_history(state: AppState, config: Data<Config>, path: Path<TournamentPath>) -> HttpResponse {
    with_session(&state, &config, path.id, |s| HttpResponse::Ok().json(&s.history))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, Session>::new()));
    let timeout = config.session_timeout;
    let config = Data::new(config);

    // Background task: every 30 minutes, remove sessions inactive past the timeout
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, session| session.last_activity.elapsed() < timeout);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament session(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_player)
            .service(api_enroll_player)
            .service(api_clear_roster)
            .service(api_import_roster)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_pairings)
            .service(api_report_match)
            .service(api_run_tournament)
            .service(api_history)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiss_tournament_web::HigherSeedWins;

    fn config(data_dir: Option<PathBuf>, preload: &[&str]) -> Config {
        Config {
            host: default_host(),
            port: default_port(),
            session_timeout: session_timeout(12),
            preload: preload.iter().map(|n| n.to_string()).collect(),
            data_dir,
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sessions-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn huge_timeout_saturates() {
        assert_eq!(session_timeout(2), Duration::from_secs(7200));
        assert_eq!(session_timeout(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn memory_session_run_clears_roster() {
        let mut session = Session::create(Uuid::new_v4(), &config(None, &["Ada", "Grace"])).unwrap();
        let response = session.run(&mut HigherSeedWins).unwrap();
        assert_eq!(response.record.winner_name, "Ada");
        assert_eq!(session.history.len(), 1);
        assert!(session.store.contents().players().is_empty());
        assert_eq!(session.store.contents().registry().len(), 2);
    }

    #[test]
    fn durable_session_survives_restore() {
        let dir = temp_dir();
        let id = Uuid::new_v4();
        let winner = {
            let mut session =
                Session::create(id, &config(Some(dir.clone()), &["Ada", "Grace", "Alan", "Edsger"])).unwrap();
            session.run(&mut HigherSeedWins).unwrap().record
        };

        let mut restored = Session::restore(id, &dir).unwrap().unwrap();
        assert_eq!(restored.history, vec![winner]);
        assert_eq!(restored.store.contents().registry().len(), 4);
        assert_eq!(restored.store.contents().players().len(), 0);

        // Returning players enroll by id and the next tournament lands in the same history.
        for player_id in 1..=2 {
            restored.store.registry_mut().enroll_existing(player_id).unwrap();
        }
        restored.run(&mut HigherSeedWins).unwrap();
        let reloaded = Session::restore(id, &dir).unwrap().unwrap();
        assert_eq!(reloaded.history.len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unknown_session_is_not_restored() {
        let dir = temp_dir();
        assert!(Session::restore(Uuid::new_v4(), &dir).unwrap().is_none());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn new_durable_session_is_on_disk_before_any_change() {
        let dir = temp_dir();
        let id = Uuid::new_v4();
        Session::create(id, &config(Some(dir.clone()), &[])).unwrap();
        assert!(roster_file(&dir, id).exists());
        assert!(Session::restore(id, &dir).unwrap().is_some());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
