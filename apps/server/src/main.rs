// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprints Server - read-only HTTP API over normalized building footprints.
//!
//! Each endpoint maps onto one query shape over the footprint schema written
//! by `footprints-ingest`. Requests are independent; the only shared
//! resource is the database pool.
//!
//! # Endpoints
//!
//! - `GET /` - Route listing
//! - `GET /health` - Health check
//! - `GET /buildings` - All buildings
//! - `GET /buildings/:year` - Buildings constructed in a year
//! - `GET /dimensions/:building` - Elevation and roof height of one building
//! - `GET /avgElevation` - Buildings above the average ground elevation
//! - `GET /numDataSource/:group` - Counts by geometry `source` or `type`
//! - `GET /buildings/:x_range/:y_range` - Buildings inside a coordinate box

use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Router};
use footprints_core::{BuildingRepository, PgStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
mod error;
mod routes;

use config::Config;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BuildingRepository>,
    pub config: Arc<Config>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}

/// Build the router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs,
        )))
        .layer(CompressionLayer::new());

    Router::new()
        .route("/", get(routes::health::info))
        .route("/health", get(routes::health::check))
        .route("/buildings", get(routes::buildings::all))
        .route("/buildings/:year", get(routes::buildings::by_year))
        .route("/buildings/:x_range/:y_range", get(routes::buildings::in_range))
        .route("/dimensions/:building", get(routes::buildings::dimensions))
        .route("/avgElevation", get(routes::buildings::above_average_elevation))
        .route("/numDataSource/:group", get(routes::buildings::count_by_group))
        .layer(middleware)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Initialize logging
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,tower_http=debug,footprints_server=debug".into());
    if config.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).pretty().init();
    }

    tracing::info!(
        port = config.port,
        request_timeout_secs = config.request_timeout_secs,
        db_host = %config.database.host,
        db_name = %config.database.name,
        max_connections = config.database.max_connections,
        "Starting Footprints Server"
    );

    // Lazy pool: requests made while the database is down answer 503.
    let store = PgStore::connect_lazy(&config.database).context("invalid database settings")?;

    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config.clone()),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
