//! Local single-session host: JSON API over the ranking engine.
//! Run with: cargo run --bin web
//! Listens on 127.0.0.1:8080 by default; the session is saved to session.json after every change.
//! Override with env: HOST, PORT, SESSION_FILE.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use archetype_ranker::{
    advance_phase_if_round_complete, apply_duel_result, apply_group_result, begin_next_match,
    create_initial_state_with, is_swiss_complete, merge_enrichment, next_swiss_pair, standings,
    swiss_round, top_ten, undo_last_result, CandidateName, Enrichment, JsonFileStore,
    SessionStore, Tournament, TournamentError, TournamentSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// The one session this host serves, plus where it is persisted.
struct Session {
    tournament: Option<Tournament>,
    store: JsonFileStore,
}

/// Calls into the engine are serialized through this lock.
type AppState = Data<RwLock<Session>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Tournament plus derived values the UI needs on every screen.
#[derive(Serialize)]
struct SessionView<'a> {
    tournament: &'a Tournament,
    swiss_complete: bool,
    swiss_round: u32,
}

#[derive(Deserialize)]
struct CreateSessionBody {
    names: Vec<CandidateName>,
    /// Random when omitted.
    seed: Option<u64>,
    #[serde(default)]
    enrichment: BTreeMap<CandidateName, Enrichment>,
    #[serde(default)]
    settings: TournamentSettings,
}

#[derive(Deserialize)]
struct GroupResultBody {
    winner: CandidateName,
    losers: Vec<CandidateName>,
}

#[derive(Deserialize)]
struct DuelResultBody {
    winner: CandidateName,
    loser: CandidateName,
}

fn view(t: &Tournament) -> HttpResponse {
    HttpResponse::Ok().json(SessionView {
        tournament: t,
        swiss_complete: is_swiss_complete(t),
        swiss_round: swiss_round(t),
    })
}

fn no_session() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" }))
}

fn engine_error(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::NothingToUndo => HttpResponse::Conflict().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// Persist and install a new state, or report the engine error. A failed save keeps the new state in memory.
fn commit(session: &mut Session, result: Result<Tournament, TournamentError>) -> HttpResponse {
    match result {
        Ok(next) => {
            if let Err(e) = session.store.save(&next) {
                log::warn!("Failed to save session to {}: {}", session.store.path().display(), e);
            }
            let resp = view(&next);
            session.tournament = Some(next);
            resp
        }
        Err(e) => engine_error(e),
    }
}

/// Run `op` against the current session and commit its result.
fn transition<F>(state: &AppState, op: F) -> HttpResponse
where
    F: FnOnce(&Tournament) -> Result<Tournament, TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let result = match g.tournament.as_ref() {
        Some(t) => op(t),
        None => return no_session(),
    };
    commit(&mut g, result)
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "archetype-ranker",
    })
}

/// Current session (404 if none).
#[get("/api/session")]
async fn api_get_session(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.tournament.as_ref() {
        Some(t) => view(t),
        None => no_session(),
    }
}

/// Start a new session, replacing any existing one.
#[post("/api/session")]
async fn api_create_session(state: AppState, body: Json<CreateSessionBody>) -> HttpResponse {
    let body = body.into_inner();
    let seed = body.seed.unwrap_or_else(|| u64::from(rand::random::<u32>()));
    let entries = body
        .names
        .into_iter()
        .map(|name| {
            let enrichment = body.enrichment.get(name.trim()).cloned().unwrap_or_default();
            (name, enrichment)
        })
        .collect();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let result = create_initial_state_with(entries, seed, body.settings);
    commit(&mut g, result)
}

/// Drop the session and its saved copy.
#[delete("/api/session")]
async fn api_clear_session(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if let Err(e) = g.store.clear() {
        return HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }));
    }
    g.tournament = None;
    HttpResponse::NoContent().finish()
}

/// Merge enrichment provider results (name → richness and theme tags).
#[put("/api/session/enrichment")]
async fn api_merge_enrichment(
    state: AppState,
    body: Json<BTreeMap<CandidateName, Enrichment>>,
) -> HttpResponse {
    transition(&state, |t| merge_enrichment(t, &body))
}

/// Present the next group or Swiss pair (finishes the tournament when none is left).
#[post("/api/session/next")]
async fn api_next_match(state: AppState) -> HttpResponse {
    transition(&state, |t| Ok(begin_next_match(t)))
}

/// Peek at the pair the Swiss pairing would pick next.
#[get("/api/session/swiss/next-pair")]
async fn api_next_swiss_pair(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.tournament.as_ref() {
        Some(t) => HttpResponse::Ok().json(next_swiss_pair(t)),
        None => no_session(),
    }
}

#[post("/api/session/group-result")]
async fn api_group_result(state: AppState, body: Json<GroupResultBody>) -> HttpResponse {
    transition(&state, |t| apply_group_result(t, &body.winner, &body.losers))
}

#[post("/api/session/duel-result")]
async fn api_duel_result(state: AppState, body: Json<DuelResultBody>) -> HttpResponse {
    transition(&state, |t| apply_duel_result(t, &body.winner, &body.loser))
}

/// Advance the round/phase if complete (e.g. after the result screen of the last Swiss duel).
#[post("/api/session/advance")]
async fn api_advance(state: AppState) -> HttpResponse {
    transition(&state, |t| Ok(advance_phase_if_round_complete(t)))
}

/// Undo the most recent result (409 if nothing to undo).
#[post("/api/session/undo")]
async fn api_undo(state: AppState) -> HttpResponse {
    transition(&state, undo_last_result)
}

#[get("/api/session/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.tournament.as_ref() {
        Some(t) => HttpResponse::Ok().json(standings(t)),
        None => no_session(),
    }
}

#[get("/api/session/top-ten")]
async fn api_top_ten(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.tournament.as_ref() {
        Some(t) => HttpResponse::Ok().json(top_ten(t)),
        None => no_session(),
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_session_file() -> String {
    "session.json".to_string()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let session_file = std::env::var("SESSION_FILE").unwrap_or_else(|_| default_session_file());

    let store = JsonFileStore::new(session_file);
    let tournament = store.load();
    match &tournament {
        Some(t) => log::info!(
            "Resumed session from {}: {} phase, {} results",
            store.path().display(),
            t.phase,
            t.round_counter
        ),
        None => log::info!("No saved session at {}", store.path().display()),
    }

    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(Session { tournament, store }));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_get_session)
            .service(api_create_session)
            .service(api_clear_session)
            .service(api_merge_enrichment)
            .service(api_next_match)
            .service(api_next_swiss_pair)
            .service(api_group_result)
            .service(api_duel_result)
            .service(api_advance)
            .service(api_undo)
            .service(api_standings)
            .service(api_top_ten)
    })
    .bind(bind)?
    .run()
    .await
}
