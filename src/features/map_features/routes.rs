use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::map_features::handlers;
use crate::features::map_features::services::FeatureService;

/// Create routes for the map features feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(service: Arc<FeatureService>) -> Router {
    Router::new()
        .route("/api/features/nearby", get(handlers::nearby_features))
        .route("/api/features/{id}", get(handlers::get_feature))
        .with_state(service)
}
