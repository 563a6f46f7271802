use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::map_features::dtos::{
    LocationFeatureCollectionDto, LocationFeatureDto, NearbyFeaturesQuery,
};
use crate::features::map_features::services::FeatureService;
use crate::shared::types::ApiResponse;

/// Visible locations inside a map viewport
///
/// The viewport's pixel size is converted to ground distance at the given
/// zoom level and latitude, then searched as a box around the center.
#[utoipa::path(
    get,
    path = "/api/features/nearby",
    params(NearbyFeaturesQuery),
    responses(
        (status = 200, description = "GeoJSON feature collection", body = ApiResponse<LocationFeatureCollectionDto>),
        (status = 400, description = "Invalid viewport parameters")
    ),
    tag = "features"
)]
pub async fn nearby_features(
    State(service): State<Arc<FeatureService>>,
    Query(query): Query<NearbyFeaturesQuery>,
) -> Result<Json<ApiResponse<LocationFeatureCollectionDto>>> {
    let collection = service.nearby(query).await?;
    Ok(Json(ApiResponse::success(Some(collection), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/features/{id}",
    params(
        ("id" = String, Path, description = "Location id")
    ),
    responses(
        (status = 200, description = "GeoJSON feature", body = ApiResponse<LocationFeatureDto>),
        (status = 404, description = "Feature not found")
    ),
    tag = "features"
)]
pub async fn get_feature(
    State(service): State<Arc<FeatureService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LocationFeatureDto>>> {
    let feature = service.get(&id).await?;
    Ok(Json(ApiResponse::success(Some(feature), None, None)))
}
