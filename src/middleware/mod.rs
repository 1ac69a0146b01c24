use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::debug;

use crate::{
    error::{AppError, ReservationError},
    session::AuthSession,
    AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub name: String,
}

// Session cookie extractor
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let unauthenticated = || AppError::Unauthorized("Not authenticated".to_string());

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg))?;

        let user_id = AuthSession::new(&session)
            .user_id()
            .await?
            .ok_or_else(unauthenticated)?;

        // session may outlive the account
        let user = state.users.get_user(user_id).await?.ok_or_else(unauthenticated)?;

        Ok(AuthUser { user_id: user.id, email: user.email, name: user.name })
    }
}

/// The `{id}` segment of airplane routes. A segment that is not a number
/// names no airplane, so it answers 404 like an unknown id.
#[derive(Debug, Clone, Copy)]
pub struct AirplaneId(pub i32);

impl<S> FromRequestParts<S> for AirplaneId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i32>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(AirplaneId(id)),
            Err(rejection) => {
                debug!("airplane id rejected: {}", rejection.body_text());
                Err(ReservationError::AirplaneNotFound.into())
            }
        }
    }
}
