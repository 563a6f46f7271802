use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::tags::services::TagService;
use crate::shared::types::ApiResponse;

/// List the tag vocabulary
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "All tags, alphabetically", body = ApiResponse<Vec<String>>),
        (status = 503, description = "Data store unavailable")
    ),
    tag = "tags"
)]
pub async fn list_tags(
    State(service): State<Arc<TagService>>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let tags = service.list().await?;
    Ok(Json(ApiResponse::success(Some(tags), None, None)))
}
