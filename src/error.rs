//! Error types and their HTTP mapping.
//!
//! Every error body has the shape `{"errors": [..]}`; reservation conflicts
//! add the offending seats (`duplicateSeats`, `invalidSeats`, `occupiedSeats`)
//! so the client can highlight them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::models::{ReservedSeat, Seat};
use crate::repository::RepositoryError;

/// Reasons a reservation request is refused.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Duplicate seat(s) selected")]
    DuplicateSeats(Vec<Seat>),

    #[error("Requested airplane doesn't exist")]
    AirplaneNotFound,

    #[error("User already made a reservation for the airplane")]
    AlreadyReserved,

    #[error("User already made a reservation for another airplane")]
    ReservedElsewhere { airplane_id: i32 },

    #[error("Selected seats are not valid")]
    InvalidSeats(Vec<Seat>),

    #[error("Selected seats are not available")]
    SeatsUnavailable(Vec<ReservedSeat>),

    #[error("Not enough seats available")]
    NotEnoughSeats { requested: usize, available: usize },
}

impl ReservationError {
    pub fn status(&self) -> StatusCode {
        match self {
            ReservationError::DuplicateSeats(_) => StatusCode::BAD_REQUEST,
            ReservationError::AirplaneNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Reservation(#[from] ReservationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),

    /// Wiring problem, e.g. a handler mounted outside the session layer.
    #[error("{0}")]
    Internal(&'static str),

    #[error("{}", .0.join("; "))]
    BadRequest(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_seats: Option<Vec<Seat>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_seats: Option<Vec<Seat>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied_seats: Option<Vec<ReservedSeat>>,
}

impl ErrorBody {
    pub fn message(msg: impl Into<String>) -> Self {
        Self { errors: vec![msg.into()], ..Default::default() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Reservation(err) => {
                let status = err.status();
                let mut body = ErrorBody::message(err.to_string());
                match err {
                    ReservationError::DuplicateSeats(seats) => body.duplicate_seats = Some(seats),
                    ReservationError::InvalidSeats(seats) => body.invalid_seats = Some(seats),
                    ReservationError::SeatsUnavailable(seats) => body.occupied_seats = Some(seats),
                    _ => {}
                }
                (status, body)
            }
            AppError::Repository(RepositoryError::SeatTaken) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody::message("Selected seats are not available"),
            ),
            AppError::Repository(err) => {
                tracing::error!("repository error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message("Database error"))
            }
            AppError::Session(err) => {
                tracing::error!("session store error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message("Session error"))
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message("Internal server error"))
            }
            AppError::BadRequest(errors) => {
                (StatusCode::BAD_REQUEST, ErrorBody { errors, ..Default::default() })
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorBody::message(msg)),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages(&errors, &mut messages);
        messages.sort();
        messages.dedup();
        AppError::BadRequest(messages)
    }
}

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    match &error.message {
                        Some(msg) => out.push(msg.to_string()),
                        None => out.push(format!("{} is invalid", field)),
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_messages(nested, out);
                }
            }
        }
    }
}
