//! PureCast water quality dashboard
//!
//! Backend for a water-quality dashboard: keeps the sensor controls in sync,
//! submits readings to an external scoring service, and maintains the score
//! history, remediation advice, alert log and exportable report.
//!
//! The water quality index itself is computed by the scoring service.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod alerts;
mod catalog;
mod config;
mod engine;
mod error;
mod handlers;
mod history;
mod models;
mod prediction;
mod recommendation;
mod render;
mod report;
mod state;
mod sync;
mod validation;
mod websocket;

use crate::config::Settings;
use crate::prediction::PredictionClient;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenv::dotenv().ok();

    // Logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,purecast=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();

    // Load configuration
    let settings = Settings::from_env().context("Failed to load configuration")?;
    let bind_address = format!("{}:{}", settings.server.host, settings.server.port);

    validation::validate_catalog(catalog::parameters())
        .context("Parameter catalog violates its range invariant")?;

    info!("Starting PureCast backend");
    info!(
        scoring_url = %settings.scoring.base_url,
        live_data_url = %settings.scoring.live_data_url,
        "Using external scoring service"
    );
    info!("Binding server to {}", bind_address);

    let client = PredictionClient::new(&settings.scoring)
        .context("Failed to build scoring HTTP client")?;

    // Shared application state
    let app_state = Arc::new(RwLock::new(AppState::new()));
    let report_settings = settings.report.clone();

    // ---------------------------------------------------------------------
    // HTTP + WebSocket server
    // ---------------------------------------------------------------------
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(report_settings.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
