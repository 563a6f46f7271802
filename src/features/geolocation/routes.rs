use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::geolocation::handlers;
use crate::features::geolocation::services::GeolocationService;

/// Create routes for the geolocation feature
pub fn routes(service: Arc<GeolocationService>) -> Router {
    Router::new()
        .route(
            "/api/geolocation/coordinates",
            get(handlers::get_coordinates),
        )
        .route("/api/geolocation/address", get(handlers::get_address))
        .with_state(service)
}
