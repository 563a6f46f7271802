use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::geolocation::dtos::{AddressQuery, CoordinatesQuery};
use crate::features::geolocation::services::GeolocationService;
use crate::shared::geo::{Address, Coordinates};
use crate::shared::types::ApiResponse;

/// Coordinates for a postal address
#[utoipa::path(
    get,
    path = "/api/geolocation/coordinates",
    params(AddressQuery),
    responses(
        (status = 200, description = "Coordinates found", body = ApiResponse<Coordinates>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "No match for the address"),
        (status = 502, description = "Geocoding provider error")
    ),
    tag = "geolocation"
)]
pub async fn get_coordinates(
    State(service): State<Arc<GeolocationService>>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<ApiResponse<Coordinates>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let coordinates = service.coordinates(&query.into()).await?;
    Ok(Json(ApiResponse::success(Some(coordinates), None, None)))
}

/// Postal address at a point
#[utoipa::path(
    get,
    path = "/api/geolocation/address",
    params(CoordinatesQuery),
    responses(
        (status = 200, description = "Address found", body = ApiResponse<Address>),
        (status = 400, description = "Coordinates out of range"),
        (status = 404, description = "No address at the coordinates"),
        (status = 502, description = "Geocoding provider error")
    ),
    tag = "geolocation"
)]
pub async fn get_address(
    State(service): State<Arc<GeolocationService>>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<ApiResponse<Address>>> {
    let address = service.address(query.into()).await?;
    Ok(Json(ApiResponse::success(Some(address), None, None)))
}
