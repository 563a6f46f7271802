use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::locations::dtos::{
    DeleteLocationResponseDto, LocationRequestDto, NearbyLocationsQuery,
};
use crate::features::locations::models::Location;
use crate::features::locations::services::LocationService;
use crate::shared::constants::MAX_PAGE_SIZE;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List locations
///
/// Ordered by id; `meta.total` carries the number of stored locations.
#[utoipa::path(
    get,
    path = "/api/locations",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of locations", body = ApiResponse<Vec<Location>>),
        (status = 503, description = "Data store unavailable")
    ),
    tag = "locations"
)]
pub async fn list_locations(
    State(service): State<Arc<LocationService>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<Location>>>> {
    let limit = usize::try_from(query.limit()).unwrap_or(MAX_PAGE_SIZE as usize);
    let (locations, total) = service.list(query.offset(), limit).await?;

    Ok(Json(ApiResponse::success(
        Some(locations),
        None,
        Some(Meta {
            total: total as i64,
        }),
    )))
}

/// Find locations near a point
///
/// Give either `radius`, or both `width` and `height` for a box search.
#[utoipa::path(
    get,
    path = "/api/locations/nearby",
    params(NearbyLocationsQuery),
    responses(
        (status = 200, description = "Matching locations ordered by distance", body = ApiResponse<Vec<Location>>),
        (status = 400, description = "Invalid search parameters")
    ),
    tag = "locations"
)]
pub async fn nearby_locations(
    State(service): State<Arc<LocationService>>,
    Query(query): Query<NearbyLocationsQuery>,
) -> Result<Json<ApiResponse<Vec<Location>>>> {
    let locations = service.nearby(query.into()).await?;
    Ok(Json(ApiResponse::success(Some(locations), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    params(
        ("id" = String, Path, description = "Location id")
    ),
    responses(
        (status = 200, description = "Location found", body = ApiResponse<Location>),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn get_location(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Location>>> {
    let location = service.get(&id).await?;
    Ok(Json(ApiResponse::success(Some(location), None, None)))
}

/// Create a location
///
/// Coordinates are looked up from the address when omitted.
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = LocationRequestDto,
    responses(
        (status = 201, description = "Location created", body = ApiResponse<Location>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Location id already exists")
    ),
    tag = "locations"
)]
pub async fn create_location(
    State(service): State<Arc<LocationService>>,
    AppJson(dto): AppJson<LocationRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<Location>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let location = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(location),
            Some("Location created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    params(
        ("id" = String, Path, description = "Location id")
    ),
    request_body = LocationRequestDto,
    responses(
        (status = 200, description = "Location updated", body = ApiResponse<Location>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn update_location(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<LocationRequestDto>,
) -> Result<Json<ApiResponse<Location>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let location = service.update(&id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(location),
        Some("Location updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    params(
        ("id" = String, Path, description = "Location id")
    ),
    responses(
        (status = 200, description = "Location deleted", body = ApiResponse<DeleteLocationResponseDto>),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn delete_location(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteLocationResponseDto>>> {
    service.delete(&id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteLocationResponseDto { id, deleted: true }),
        None,
        None,
    )))
}
