// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building query endpoints.
//!
//! Each handler parses its path parameters into a [`BuildingQuery`] and runs
//! it against the shared store. Parameter errors are answered with 400
//! before the store is touched.

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Path, State},
    Json,
};
use footprints_core::{execute, BuildingQuery, QueryResponse};

/// [`Path`] whose rejection is answered with the JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

async fn run(state: &AppState, query: BuildingQuery) -> Result<Json<QueryResponse>, ApiError> {
    let response = execute(state.store.as_ref(), &query).await?;
    Ok(Json(response))
}

/// GET /buildings - All buildings.
pub async fn all(State(state): State<AppState>) -> Result<Json<QueryResponse>, ApiError> {
    run(&state, BuildingQuery::All).await
}

/// GET /buildings/:year - Buildings constructed in `year`.
pub async fn by_year(
    State(state): State<AppState>,
    PathParam(year): PathParam<String>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = BuildingQuery::by_year(&year)?;
    run(&state, query).await
}

/// GET /dimensions/:building - Dimensions of one building.
pub async fn dimensions(
    State(state): State<AppState>,
    PathParam(building): PathParam<String>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = BuildingQuery::dimensions(&building)?;
    run(&state, query).await
}

/// GET /avgElevation - Buildings above the average ground elevation.
pub async fn above_average_elevation(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, ApiError> {
    run(&state, BuildingQuery::AboveAverageElevation).await
}

/// GET /numDataSource/:group - Building counts by geometry source or type.
pub async fn count_by_group(
    State(state): State<AppState>,
    PathParam(group): PathParam<String>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = BuildingQuery::count_by(&group)?;
    run(&state, query).await
}

/// GET /buildings/:x_range/:y_range - Buildings inside a coordinate box.
pub async fn in_range(
    State(state): State<AppState>,
    PathParam((x_range, y_range)): PathParam<(String, String)>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = BuildingQuery::in_range(&x_range, &y_range)?;
    tracing::debug!(x_range = %x_range, y_range = %y_range, "Coordinate range lookup");
    run(&state, query).await
}
