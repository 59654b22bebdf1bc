use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use serde_json::json;

use crate::cache::SolutionCache;
use crate::config::{ServerConfig, SolverConfig};
use crate::convert::{to_integer_program, to_switchboard};
use crate::domain::solve::{aggregate, locate, solve_lights, Aggregate};
use crate::domain::solver_factory::{create_solver, SolverType};
use crate::error::RunError;
use crate::models::{ApiSolution, Mode, Record, SolveRequest, SolveResponse};
use crate::parse::parse_input;

/// Shared across workers; holds no per-switchboard state besides the cache.
pub struct AppState {
    pub solver: SolverConfig,
    pub cache: SolutionCache,
}

impl AppState {
    pub fn new(solver: SolverConfig, cache_capacity: usize) -> Self {
        AppState {
            solver,
            cache: SolutionCache::new(cache_capacity),
        }
    }
}

enum RequestError {
    Invalid(String),
    Run(RunError),
}

impl From<RunError> for RequestError {
    fn from(error: RunError) -> Self {
        RequestError::Run(error)
    }
}

fn to_records(request: &SolveRequest) -> Result<Vec<Record>, RequestError> {
    match (&request.input, &request.switchboards) {
        (Some(input), None) => Ok(parse_input(input)?),
        (None, Some(boards)) => boards
            .iter()
            .enumerate()
            .map(|(idx, api)| {
                to_switchboard(api)
                    .map(|switchboard| Record {
                        line: idx + 1,
                        switchboard,
                    })
                    .map_err(|source| RequestError::Run(RunError::Format { line: idx + 1, source }))
            })
            .collect(),
        _ => Err(RequestError::Invalid(
            "exactly one of `input` or `switchboards` is required".to_string(),
        )),
    }
}

fn run_request(state: &AppState, request: SolveRequest) -> Result<SolveResponse, RequestError> {
    let records = to_records(&request)?;

    let mut config = state.solver.clone();
    if let Some(name) = &request.solver {
        config.solver = SolverType::from_str(name)
            .ok_or_else(|| RequestError::Invalid(format!("unknown solver `{}`", name)))?;
    }

    let Aggregate { total, solutions } = match request.mode {
        Mode::Joltage => {
            let solver = create_solver(&config);
            aggregate(&records, true, |index, record| {
                let key = format!("{}|{}", config.solver.as_str(), record.switchboard);
                state
                    .cache
                    .get_or_solve(key, || solver.solve(&to_integer_program(&record.switchboard)))
                    .map_err(|source| locate(index, record, source))
            })?
        }
        Mode::Lights => solve_lights(&records, config.enumeration_limit, true)?,
    };

    Ok(SolveResponse {
        total,
        solutions: solutions
            .into_iter()
            .map(|(line, s)| ApiSolution {
                line,
                presses: s.presses,
                total: s.total,
            })
            .collect(),
    })
}

fn error_response(error: RequestError) -> HttpResponse {
    match error {
        RequestError::Invalid(message) => HttpResponse::BadRequest().json(json!({ "error": message })),
        RequestError::Run(RunError::Format { line, source }) => {
            HttpResponse::BadRequest().json(json!({ "error": source.to_string(), "line": line }))
        }
        RequestError::Run(RunError::Solve { line, index, source }) => {
            warn!("switchboard {} on line {} failed: {}", index, line, source);
            HttpResponse::UnprocessableEntity().json(json!({
                "error": source.to_string(),
                "code": source.code(),
                "line": line,
                "index": index,
                "retryable": source.is_retryable(),
            }))
        }
        RequestError::Run(RunError::TotalOverflow { line }) => {
            HttpResponse::UnprocessableEntity().json(json!({
                "error": format!("total presses exceed {}", u64::MAX),
                "code": "TOTAL_OVERFLOW",
                "line": line,
                "retryable": false,
            }))
        }
        RequestError::Run(other) => {
            HttpResponse::InternalServerError().json(json!({ "error": other.to_string() }))
        }
    }
}

// ---------- Route handlers ----------

/// POST /solve
pub async fn solve(state: web::Data<AppState>, req: web::Json<SolveRequest>) -> impl Responder {
    let request = req.into_inner();
    match web::block(move || run_request(&state, request)).await {
        Ok(Ok(response)) => HttpResponse::Ok().json(response),
        Ok(Err(error)) => error_response(error),
        Err(error) => HttpResponse::InternalServerError().json(json!({ "error": error.to_string() })),
    }
}

/// GET /health
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// GET /docs
pub async fn docs() -> impl Responder {
    let docs_html = include_str!("../static/docs.html");
    HttpResponse::Ok().content_type("text/html").body(docs_html)
}

/// GET / - Redirect to docs
pub async fn root_redirect() -> impl Responder {
    HttpResponse::Found()
        .append_header(("Location", "/docs"))
        .finish()
}

pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _| {
            let err_string = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(json!({ "error": err_string })),
            )
            .into()
        })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root_redirect))
        .route("/solve", web::post().to(solve))
        .route("/health", web::get().to(health_check))
        .route("/docs", web::get().to(docs));
}

// ---------- Server bootstrap ----------

pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(config.solver.clone(), config.cache_capacity));
    let json_limit = config.json_limit;

    info!(
        "Starting server on http://127.0.0.1:{} (solver {})",
        config.port,
        config.solver.solver.as_str()
    );
    HttpServer::new(move || {
        App::new()
            .wrap(sentry_actix::Sentry::new())
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(json_config(json_limit))
            .configure(routes)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
