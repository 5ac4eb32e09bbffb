//! Hanger Engine HTTP Server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use hanger_engine::prelude::*;

const DEFAULT_PORT: u16 = 8086;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct PlacementRequest {
    scene: Scene,
    #[serde(default)]
    options: SupportOptions,
    #[serde(default)]
    rules: Option<ClassificationRules>,
    #[serde(default)]
    kit: HardwareKit,
    #[serde(default)]
    runs: Vec<RunSegment>,
    /// Run ids resolved through the scene's segment table
    #[serde(default)]
    run_ids: Vec<ElementId>,
    #[serde(default)]
    racks: Vec<Vec<RunSegment>>,
    #[serde(default)]
    trays: Vec<TrayRun>,
    #[serde(default)]
    fixtures: Vec<FixtureHost>,
}

#[derive(Debug, Serialize)]
struct PlacementResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<ResultsData>,
}

#[derive(Debug, Serialize)]
struct ResultsData {
    supports: Vec<SupportRecord>,
    diagnostics: Vec<Diagnostic>,
    failures: Vec<Failure>,
    hardware: Vec<LineItem>,
    summary: SummaryResult,
}

/// One input that could not be placed; `index` is its position in the
/// request list named by `kind`
#[derive(Debug, Serialize)]
struct Failure {
    kind: &'static str,
    index: usize,
    error: String,
}

#[derive(Debug, Serialize)]
struct SummaryResult {
    num_supports: usize,
    num_skipped: usize,
    total_rod_length: f64,
    total_couplings: u32,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn place(Json(request): Json<PlacementRequest>) -> impl IntoResponse {
    match run_placement(request) {
        Ok(results) => (
            StatusCode::OK,
            Json(PlacementResponse {
                success: true,
                error: None,
                results: Some(results),
            }),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(PlacementResponse {
                success: false,
                error: Some(e.to_string()),
                results: None,
            }),
        ),
    }
}

fn run_placement(request: PlacementRequest) -> HangerResult<ResultsData> {
    let mut engine = SupportEngine::new(request.options, &request.scene)?;
    if let Some(rules) = request.rules {
        engine = engine.with_rules(rules)?;
    }

    // A failed run, fixture, tray or rack is reported; the rest still goes through
    let mut outcomes = Vec::new();
    let mut failures = Vec::new();
    let mut collect = |kind: &'static str, results: Vec<HangerResult<PlacementOutcome>>| {
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => failures.push(Failure {
                    kind,
                    index,
                    error: e.to_string(),
                }),
            }
        }
    };
    collect("run", engine.place_single_each(&request.runs));
    collect("run_ids", vec![engine.place_single_runs(&request.run_ids)]);
    collect("fixture", engine.place_fixtures_each(&request.fixtures));
    collect("tray", engine.place_trays(&request.trays));
    collect("rack", engine.place_racks(&request.racks));

    let hardware = engine.hardware_total(&outcomes, &request.kit).line_items();

    let mut merged = PlacementOutcome::new();
    for outcome in outcomes {
        merged.extend(outcome);
    }

    let summary = SummaryResult {
        num_supports: merged.supports.len(),
        num_skipped: merged.skipped_points(),
        total_rod_length: merged.supports.iter().map(SupportRecord::total_rod_length).sum(),
        total_couplings: merged.supports.iter().map(SupportRecord::coupling_count).sum(),
    };

    Ok(ResultsData {
        supports: merged.supports,
        diagnostics: merged.diagnostics,
        failures,
        hardware,
        summary,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let port = match std::env::var("HANGER_PORT") {
        Ok(value) => value.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/place", post(place))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Hanger Engine Server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Placement:    POST /api/v1/place");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
