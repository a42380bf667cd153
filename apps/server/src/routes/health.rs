// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check and route listing endpoints.

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub database: &'static str,
}

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// GET /health - Liveness plus a store round trip.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, label, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "up"),
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            version: env!("CARGO_PKG_VERSION"),
            service: "footprints-server",
            database,
        }),
    )
}

/// GET / - Route listing.
pub async fn info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "footprints-server",
        version: env!("CARGO_PKG_VERSION"),
        description: "Homepage for Building Footprints",
        endpoints: vec![
            EndpointInfo {
                method: "GET",
                path: "/buildings",
                description: "All buildings",
            },
            EndpointInfo {
                method: "GET",
                path: "/buildings/{year}",
                description: "Buildings constructed in the given year",
            },
            EndpointInfo {
                method: "GET",
                path: "/dimensions/{building}",
                description: "Ground elevation and roof height of one building",
            },
            EndpointInfo {
                method: "GET",
                path: "/avgElevation",
                description: "Buildings with ground elevation above the average elevation",
            },
            EndpointInfo {
                method: "GET",
                path: "/numDataSource/{group}",
                description: "Number of buildings grouped by geometry 'source' or 'type'",
            },
            EndpointInfo {
                method: "GET",
                path: "/buildings/{x_range}/{y_range}",
                description: "Buildings inside a coordinate box, e.g. /buildings/-75,-70/35,45",
            },
            EndpointInfo {
                method: "GET",
                path: "/health",
                description: "Health check endpoint",
            },
        ],
    })
}
