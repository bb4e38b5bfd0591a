//! HTTP wrapper around the draw library: admin draw actions, result writes, public standings.
//! Run with: cargo run --bin web
//! Env: HOST (default 0.0.0.0), PORT (default 8080), QUALIFIERS_PER_GROUP (default 2), RUST_LOG.
//! Admin routes require the caller role header `X-Role: ADMIN`.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use intramural_draw::logic::DEFAULT_QUALIFIERS_PER_GROUP;
use intramural_draw::{
    standings_csv, DrawService, DrawSettings, DrawType, EnrollmentStatus, EntityStore, EntrantId,
    ErrorKind, MatchId, MemoryStore, PromotionSettings, ResultUpdate, StoreError, Tournament,
    TournamentError, TournamentId,
};
use serde::Deserialize;

type AppState = Data<DrawService<MemoryStore>>;

/// Header carrying the caller's role, set by the authentication layer in front of us.
const ROLE_HEADER: &str = "X-Role";

struct Config {
    host: String,
    port: u16,
    qualifiers_per_group: usize,
}

impl Config {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            qualifiers_per_group: std::env::var("QUALIFIERS_PER_GROUP")
                .ok()
                .and_then(|q| q.parse().ok())
                .unwrap_or(DEFAULT_QUALIFIERS_PER_GROUP),
        }
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
}

#[derive(Deserialize)]
struct AddEntrantBody {
    name: String,
}

#[derive(Deserialize)]
struct EnrollmentStatusBody {
    status: EnrollmentStatus,
}

#[derive(Deserialize)]
struct DrawBody {
    #[serde(rename = "type")]
    draw_type: DrawType,
    #[serde(flatten)]
    settings: DrawSettings,
}

#[derive(Deserialize, Default)]
struct PromoteBody {
    qualifiers_per_group: Option<usize>,
    #[serde(default)]
    force: bool,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and entrant id
#[derive(Deserialize)]
struct TournamentEntrantPath {
    id: TournamentId,
    entrant_id: EntrantId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

fn is_admin(req: &HttpRequest) -> bool {
    req.headers()
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|role| role.eq_ignore_ascii_case("ADMIN"))
        .unwrap_or(false)
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(serde_json::json!({ "error": "Admin role required" }))
}

fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Internal => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "intramural-draw",
    })
}

/// Create a tournament (admin).
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    req: HttpRequest,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    if !is_admin(&req) {
        return forbidden();
    }
    let tournament = Tournament::new(body.name.trim());
    match state.store().insert_tournament(tournament.clone()) {
        Ok(()) => HttpResponse::Ok().json(tournament),
        Err(e) => error_response(e.into()),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store().tournament(path.id) {
        Ok(Some(t)) => HttpResponse::Ok().json(t),
        Ok(None) => error_response(TournamentError::TournamentNotFound(path.id)),
        Err(e) => error_response(e.into()),
    }
}

/// Register a team (enrollment starts Pending).
#[post("/api/tournaments/{id}/entrants")]
async fn api_add_entrant(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<AddEntrantBody>,
) -> HttpResponse {
    match state.store().register_entrant(path.id, body.name.trim()) {
        Ok(entrant) => HttpResponse::Ok().json(entrant),
        Err(StoreError::MissingRecord(_)) => {
            error_response(TournamentError::TournamentNotFound(path.id))
        }
        Err(e) => error_response(e.into()),
    }
}

/// Approve or reject a registration (admin).
#[put("/api/tournaments/{id}/entrants/{entrant_id}/status")]
async fn api_set_enrollment_status(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentEntrantPath>,
    body: Json<EnrollmentStatusBody>,
) -> HttpResponse {
    if !is_admin(&req) {
        return forbidden();
    }
    match state
        .store()
        .set_enrollment_status(path.id, path.entrant_id, body.status)
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(StoreError::MissingRecord(_)) => {
            error_response(TournamentError::EntrantNotFound(path.entrant_id))
        }
        Err(e) => error_response(e.into()),
    }
}

#[get("/api/tournaments/{id}/matches")]
async fn api_list_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store().matches(path.id) {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(e.into()),
    }
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.bracket(path.id) {
        Ok(rounds) => HttpResponse::Ok().json(rounds),
        Err(e) => error_response(e),
    }
}

/// Generate (or with force, regenerate) a bracket or group draw (admin).
#[post("/api/tournaments/{id}/draw")]
async fn api_generate_draw(
    state: AppState,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Json<DrawBody>,
) -> HttpResponse {
    if !is_admin(&req) {
        return forbidden();
    }
    let body = body.into_inner();
    match state.generate_draw(path.id, body.draw_type, &body.settings, &mut rand::thread_rng()) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(e),
    }
}

/// Promote group qualifiers into a knockout bracket (admin).
#[post("/api/tournaments/{id}/promote")]
async fn api_promote(
    state: AppState,
    config: Data<Config>,
    req: HttpRequest,
    path: Path<TournamentPath>,
    body: Option<Json<PromoteBody>>,
) -> HttpResponse {
    if !is_admin(&req) {
        return forbidden();
    }
    let body = body.map(Json::into_inner).unwrap_or_default();
    let settings = PromotionSettings {
        qualifiers_per_group: body
            .qualifiers_per_group
            .unwrap_or(config.qualifiers_per_group),
        force: body.force,
    };
    match state.promote_to_knockout(path.id, &settings, &mut rand::thread_rng()) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.standings(path.id) {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/standings/groups")]
async fn api_group_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.group_standings(path.id) {
        Ok(tables) => HttpResponse::Ok().json(tables),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let table = match state.standings(path.id) {
        Ok(table) => table,
        Err(e) => return error_response(e),
    };
    match standings_csv(&table) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(bytes),
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "CSV export failed" }))
        }
    }
}

#[get("/api/tournaments/{id}/standings/{entrant_id}")]
async fn api_team_standing(state: AppState, path: Path<TournamentEntrantPath>) -> HttpResponse {
    match state.team_standing(path.id, path.entrant_id) {
        Ok(Some(standing)) => HttpResponse::Ok().json(standing),
        Ok(None) => error_response(TournamentError::EntrantNotFound(path.entrant_id)),
        Err(e) => error_response(e),
    }
}

/// Record a match result; advances the winner in a bracket (admin).
#[put("/api/matches/{id}/result")]
async fn api_submit_result(
    state: AppState,
    req: HttpRequest,
    path: Path<MatchPath>,
    body: Json<ResultUpdate>,
) -> HttpResponse {
    if !is_admin(&req) {
        return forbidden();
    }
    match state.submit_result(path.id, body.into_inner()) {
        Ok(game) => HttpResponse::Ok().json(game),
        Err(e) => error_response(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!(
        "Starting server at http://{}:{} (qualifiers per group: {})",
        bind.0,
        bind.1,
        config.qualifiers_per_group
    );

    let state = Data::new(DrawService::new(MemoryStore::new()));
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_entrant)
            .service(api_set_enrollment_status)
            .service(api_list_matches)
            .service(api_bracket)
            .service(api_generate_draw)
            .service(api_promote)
            .service(api_standings)
            .service(api_group_standings)
            .service(api_standings_csv)
            .service(api_team_standing)
            .service(api_submit_result)
    })
    .bind(bind)?
    .run()
    .await
}
