use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{debug, info};

use crate::{
    error::AppError,
    middleware::AuthUser,
    models::{user::normalize_email, Credentials, User},
    session::AuthSession,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(login))
        .route("/sessions/current", get(current_user).delete(logout))
}

// POST /api/sessions
async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let wrong_credentials = || AppError::Unauthorized("Wrong password and/or email".to_string());

    let Json(credentials) = payload.map_err(|e| {
        debug!("login body rejected: {}", e.body_text());
        wrong_credentials()
    })?;

    let email = normalize_email(&credentials.username);
    let user = state
        .users
        .authenticate(&email, &credentials.password)
        .await?
        .ok_or_else(wrong_credentials)?;

    AuthSession::new(&session).login(user.id).await?;
    info!("User {} logged in", user.id);

    Ok(Json(user))
}

// DELETE /api/sessions/current
async fn logout(session: Session) -> Result<impl IntoResponse, AppError> {
    AuthSession::new(&session).logout().await?;
    Ok(StatusCode::OK)
}

// GET /api/sessions/current
async fn current_user(user: Result<AuthUser, AppError>) -> Result<impl IntoResponse, AppError> {
    match user {
        Ok(user) => Ok(Json(User { id: user.user_id, email: user.email, name: user.name })),
        Err(AppError::Unauthorized(_)) => {
            Err(AppError::Unauthorized("Unauthenticated user".to_string()))
        }
        Err(e) => Err(e),
    }
}
