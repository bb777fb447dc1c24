//! HTTP request handlers
//!
//! Implements the dashboard REST API. Engine state is only touched while the
//! write lock is held; scoring and live-data requests run without it, so the
//! dashboard stays responsive while they are outstanding.

use actix_web::{http::header, web, HttpRequest, HttpResponse, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::catalog;
use crate::config::ReportSettings;
use crate::engine::{PredictionSummary, ReadingSource};
use crate::error::{AppError, AppResult};
use crate::models::{EditInput, HealthCheck, Tier};
use crate::prediction::{readings_from_object, PredictionClient};
use crate::report;
use crate::state::AppState;
use crate::sync::{ControlState, EditOutcome};
use crate::validation::validate_edit_input;
use crate::websocket::WsSession;

type SharedState = web::Data<Arc<RwLock<AppState>>>;

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Health check
            .route("/health", web::get().to(health_check))
            // Catalog and controls
            .route("/parameters", web::get().to(get_parameters))
            .route("/controls", web::get().to(get_controls))
            .route("/controls/{param_id}", web::post().to(edit_control))
            // Scoring
            .route("/predict", web::post().to(predict))
            .route("/live-data", web::get().to(get_live_data))
            .route("/live-data/sync", web::post().to(sync_live_data))
            // Dashboard state
            .route("/score", web::get().to(get_score))
            .route("/history", web::get().to(get_history))
            .route("/recommendations", web::get().to(get_recommendations))
            .route("/alerts", web::get().to(get_alerts))
            // Report
            .route("/report", web::get().to(get_report))
            .route("/report/export", web::get().to(export_report)),
    )
    // WebSocket endpoint
    .route("/ws", web::get().to(websocket_handler));
}

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;

    let health = HealthCheck {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        uptime_seconds: state.uptime_seconds(),
        connected_clients: state.client_count(),
        last_prediction: state.engine.last_prediction_at(),
    };

    Ok(HttpResponse::Ok().json(health))
}

/// GET /api/parameters
pub async fn get_parameters() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(catalog::parameters()))
}

/// GET /api/controls
pub async fn get_controls(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.engine.controls()))
}

#[derive(Serialize)]
struct EditResponse {
    applied: bool,
    control: ControlState,
}

/// Dispatch an edit from the coarse or precise control
///
/// POST /api/controls/{param_id}
pub async fn edit_control(
    state: SharedState,
    path: web::Path<String>,
    body: web::Json<EditInput>,
) -> Result<HttpResponse, AppError> {
    let param_id = path.into_inner();
    validate_edit_input(&body)?;

    let mut state = state.write().await;
    let outcome = state.engine.on_edit(&param_id, &body.raw_value, body.source);

    let applied = match outcome {
        EditOutcome::UnknownParameter => {
            return Err(AppError::NotFound(format!("Unknown parameter: {}", param_id)))
        }
        EditOutcome::Ignored => false,
        EditOutcome::Applied => true,
    };

    let control = state
        .engine
        .control(&param_id)
        .ok_or_else(|| AppError::InternalError(format!("No control for {}", param_id)))?;

    Ok(HttpResponse::Ok().json(EditResponse { applied, control }))
}

/// Score the current controls, or an explicit reading set when a JSON body
/// is supplied
///
/// POST /api/predict
pub async fn predict(
    state: SharedState,
    client: web::Data<PredictionClient>,
    body: web::Bytes,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let correlation_id = extract_correlation_id(&req);
    let source = parse_reading_source(&body)?;

    info!(
        correlation_id = %correlation_id,
        explicit_readings = matches!(source, ReadingSource::Explicit(_)),
        "Received prediction request"
    );

    let summary = run_prediction(&state, &client, source).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[derive(Serialize)]
struct SyncResponse {
    synced_parameters: usize,
    prediction: PredictionSummary,
}

/// Fetch live data into the controls, then score them
///
/// POST /api/live-data/sync
pub async fn sync_live_data(
    state: SharedState,
    client: web::Data<PredictionClient>,
) -> Result<HttpResponse, AppError> {
    state.write().await.engine.begin_live_sync();

    let fetched = client.fetch_live_data().await;
    let synced_parameters = state.write().await.engine.complete_live_sync(fetched)?;

    let prediction = run_prediction(&state, &client, ReadingSource::Controls).await?;

    Ok(HttpResponse::Ok().json(SyncResponse {
        synced_parameters,
        prediction,
    }))
}

/// Values from the most recent successful live-data fetch
///
/// GET /api/live-data
pub async fn get_live_data(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    let data = state
        .engine
        .last_fetched()
        .ok_or_else(|| AppError::NotFound("No live data fetched yet".to_string()))?;

    Ok(HttpResponse::Ok().json(data))
}

async fn run_prediction(
    state: &Arc<RwLock<AppState>>,
    client: &PredictionClient,
    source: ReadingSource,
) -> AppResult<PredictionSummary> {
    let ticket = state.write().await.engine.begin_prediction(source)?;

    let result = client.predict(&ticket.readings).await;

    let mut state = state.write().await;
    Ok(state.engine.resolve_prediction(ticket, result)?)
}

// An empty body scores the controls. Entries that are not finite numbers
// are dropped here and reported as missing by the engine.
fn parse_reading_source(body: &[u8]) -> AppResult<ReadingSource> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReadingSource::Controls);
    }
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid reading set: {}", e)))?;

    Ok(ReadingSource::Explicit(readings_from_object(&object)))
}

#[derive(Serialize)]
struct ScoreResponse<'a> {
    wqi: Option<f64>,
    tier: Option<Tier>,
    assessment: Option<&'a str>,
    working: bool,
}

/// GET /api/score
pub async fn get_score(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    let score = state.engine.current_score();

    Ok(HttpResponse::Ok().json(ScoreResponse {
        wqi: score.map(|s| s.wqi),
        tier: score.map(|s| s.tier()),
        assessment: score.map(|s| s.assessment.as_str()),
        working: state.engine.is_working(),
    }))
}

/// GET /api/history
pub async fn get_history(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.engine.history()))
}

#[derive(Serialize)]
struct RecommendationsResponse<'a> {
    visible: bool,
    recommendations: &'a [String],
}

/// GET /api/recommendations
pub async fn get_recommendations(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    let recommendations = state.engine.recommendations();

    Ok(HttpResponse::Ok().json(RecommendationsResponse {
        visible: !recommendations.is_empty(),
        recommendations,
    }))
}

/// GET /api/alerts
pub async fn get_alerts(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.engine.alerts()))
}

/// GET /api/report
pub async fn get_report(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    let snapshot = state
        .engine
        .report()
        .ok_or_else(|| AppError::NotFound("No score available for a report yet".to_string()))?;

    Ok(HttpResponse::Ok().json(snapshot))
}

/// Plain-text report download
///
/// GET /api/report/export
pub async fn export_report(
    state: SharedState,
    settings: web::Data<ReportSettings>,
) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    let snapshot = state
        .engine
        .report()
        .ok_or_else(|| AppError::NotFound("No score available for a report yet".to_string()))?;

    let document = report::render_text(&snapshot, &settings.location);

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"PureCast_Report.txt\"",
        ))
        .body(document))
}

/// WebSocket upgrade handler
///
/// GET /ws
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: SharedState,
) -> Result<HttpResponse, actix_web::Error> {
    let client_id = Uuid::new_v4().to_string();

    info!(client_id = %client_id, "WebSocket connection request");

    {
        let mut state = state.write().await;
        state.add_client(client_id.clone());
    }

    let ws_session = WsSession::new(client_id, state.get_ref().clone());

    actix_web_actors::ws::start(ws_session, &req, stream)
}

/// Extract or generate correlation ID from request headers
fn extract_correlation_id(req: &HttpRequest) -> String {
    req.headers()
        .get("X-Correlation-ID")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
