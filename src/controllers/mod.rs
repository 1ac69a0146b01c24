pub mod airplanes;
pub mod reservations;
pub mod sessions;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(airplanes::routes())
        .merge(reservations::routes())
        .merge(sessions::routes())
}
