use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppError,
    middleware::AirplaneId,
    models::{AirplaneSummary, Seat},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/airplanes", get(list_airplanes))
        .route("/airplanes/{id}", get(get_airplane))
        .route("/airplanes/{id}/summary", get(get_summary))
        .route("/airplanes/{id}/suggestion", get(get_suggestion))
}

// GET /api/airplanes
async fn list_airplanes(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let airplanes: Vec<AirplaneSummary> = state
        .reservations
        .list_airplanes()
        .await?
        .into_iter()
        .map(AirplaneSummary::from)
        .collect();
    Ok(Json(airplanes))
}

// GET /api/airplanes/{id}
async fn get_airplane(
    State(state): State<Arc<AppState>>,
    AirplaneId(id): AirplaneId,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.reservations.airplane_info(id).await?))
}

// GET /api/airplanes/{id}/summary
async fn get_summary(
    State(state): State<Arc<AppState>>,
    AirplaneId(id): AirplaneId,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.reservations.summary(id).await?))
}

// GET /api/airplanes/{id}/suggestion?n=3
#[derive(Debug, Deserialize)]
struct SuggestionQuery {
    n: usize,
}

#[derive(Debug, Serialize)]
struct SuggestionResponse {
    seats: Vec<Seat>,
}

async fn get_suggestion(
    State(state): State<Arc<AppState>>,
    AirplaneId(id): AirplaneId,
    query: Result<Query<SuggestionQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = query
        .map_err(|_| AppError::BadRequest(vec!["n must be a non-negative integer".to_string()]))?;
    let seats = state.reservations.suggest(id, params.n).await?;
    Ok(Json(SuggestionResponse { seats }))
}
