//! Single binary web server: JSON API over pong tournaments, one controller per tournament.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), POINTS_TO_WIN (simulated matches, default 11).

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use pong_tournament::{
    Bracket, MatchOutcome, MatchScore, MatchTicket, Participant, ParticipantEntry,
    SimulatedRunner, TournamentController, TournamentId, TournamentMatch, TournamentState,
    TournamentView, ViewError, DEFAULT_POINTS_TO_WIN,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: controller + last activity time (for auto-cleanup).
struct TournamentEntry {
    controller: TournamentController,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Settings read from the environment at startup.
#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    points_to_win: u32,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            points_to_win: std::env::var("POINTS_TO_WIN")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_POINTS_TO_WIN),
        }
    }
}

/// The server has no screen: bracket updates go to the log.
struct LogView {
    tournament: TournamentId,
}

impl TournamentView for LogView {
    fn hide_bracket(&mut self) -> Result<(), ViewError> {
        log::debug!("[{}] match started, bracket hidden", self.tournament);
        Ok(())
    }

    fn show_bracket(&mut self, bracket: &Bracket) -> Result<(), ViewError> {
        log::debug!("[{}] bracket:\n{}", self.tournament, bracket.describe());
        Ok(())
    }

    fn match_completed(&mut self, outcome: &MatchOutcome, _bracket: &Bracket) -> Result<(), ViewError> {
        log::info!(
            "[{}] {} won by {}",
            self.tournament,
            outcome.completed.id,
            outcome.winner.name
        );
        Ok(())
    }

    fn show_champion(&mut self, champion: &Participant, _bracket: &Bracket) -> Result<(), ViewError> {
        log::info!("[{}] champion: {}", self.tournament, champion.name);
        Ok(())
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// What the client sees of a tournament.
#[derive(Serialize)]
struct TournamentSnapshot<'a> {
    id: Option<TournamentId>,
    created_at: Option<DateTime<Utc>>,
    active: bool,
    state: TournamentState,
    status: String,
    bracket: Option<&'a Bracket>,
    current_match: Option<&'a TournamentMatch>,
    running_match: Option<&'a MatchTicket>,
    champion: Option<&'a Participant>,
}

fn snapshot(c: &TournamentController) -> TournamentSnapshot<'_> {
    let manager = c.manager();
    TournamentSnapshot {
        id: manager.map(|m| m.id()),
        created_at: manager.map(|m| m.created_at()),
        active: c.is_active_tournament(),
        state: manager.map(|m| m.state()).unwrap_or_default(),
        status: c.tournament_status(),
        bracket: c.bracket(),
        current_match: c.current_match(),
        running_match: manager.and_then(|m| m.running_match()),
        champion: manager.and_then(|m| m.champion()),
    }
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    participants: Vec<ParticipantEntry>,
}

#[derive(Deserialize)]
struct ReportResultBody {
    ticket: MatchTicket,
    score: MatchScore,
}

#[derive(Deserialize)]
struct CancelMatchBody {
    ticket: MatchTicket,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

fn bad_request(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

/// Look up a tournament, refresh its activity time and run `f` on its controller.
fn with_tournament<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut TournamentController) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&mut entry.controller)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pong-tournament",
    })
}

/// Create and start a tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let mut controller = TournamentController::new();
    if let Err(e) = controller.start_tournament(&body.participants) {
        return bad_request(e);
    }
    let Some(id) = controller.manager().map(|m| m.id()) else {
        return HttpResponse::InternalServerError().body("tournament has no manager");
    };
    controller.set_view(Box::new(LogView { tournament: id }));

    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(snapshot(&controller));
    g.insert(
        id,
        TournamentEntry {
            controller,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |c| HttpResponse::Ok().json(snapshot(c)))
}

/// Start the next match; the returned ticket must accompany its result or cancellation.
#[post("/api/tournaments/{id}/matches/next")]
async fn api_start_next_match(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |c| match c.start_next_match() {
        Ok(ticket) => HttpResponse::Ok().json(ticket),
        Err(e) => bad_request(e),
    })
}

/// Report the final score of the running match.
#[post("/api/tournaments/{id}/matches/result")]
async fn api_report_result(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |c| match c.report_result(&body.ticket, body.score) {
        Ok(_) => HttpResponse::Ok().json(snapshot(c)),
        Err(e) => bad_request(e),
    })
}

/// Quit the running match; it stays unplayed.
#[post("/api/tournaments/{id}/matches/cancel")]
async fn api_cancel_match(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<CancelMatchBody>,
) -> HttpResponse {
    with_tournament(&state, path.id, |c| match c.cancel_match(&body.ticket) {
        Ok(()) => HttpResponse::Ok().json(snapshot(c)),
        Err(e) => bad_request(e),
    })
}

/// Play the next match server-side (AI vs AI only).
#[post("/api/tournaments/{id}/matches/simulate")]
async fn api_simulate_match(
    state: AppState,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let mut runner = SimulatedRunner::new(config.points_to_win);
    with_tournament(&state, path.id, |c| match c.simulate_next_match(&mut runner) {
        Ok(_) => HttpResponse::Ok().json(snapshot(c)),
        Err(e) => bad_request(e),
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));
    let config = Data::new(config);

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
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
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
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
            .service(api_start_next_match)
            .service(api_report_result)
            .service(api_cancel_match)
            .service(api_simulate_match)
    })
    .bind(bind)?
    .run()
    .await
}
