use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppError,
    middleware::{AirplaneId, AuthUser},
    models::ReservationRequest,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/airplanes/{id}/reservations",
            post(create_reservations).delete(delete_reservations),
        )
        .route("/reservations", get(get_user_reservations))
}

// POST /api/airplanes/{id}/reservations
async fn create_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AirplaneId(airplane_id): AirplaneId,
    payload: Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(vec![e.body_text()]))?;
    req.validate()?;

    state
        .reservations
        .reserve(user.user_id, airplane_id, &req.seats())
        .await?;

    Ok(StatusCode::CREATED)
}

// DELETE /api/airplanes/{id}/reservations
async fn delete_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AirplaneId(airplane_id): AirplaneId,
) -> Result<impl IntoResponse, AppError> {
    state.reservations.cancel(user.user_id, airplane_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/reservations
async fn get_user_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.reservations.user_reservations(user.user_id).await?))
}
