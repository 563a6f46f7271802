use utoipa::{Modify, OpenApi};

use crate::features::geolocation::handlers as geolocation_handlers;
use crate::features::locations::{
    dtos as locations_dtos, handlers as locations_handlers, models as locations_models,
};
use crate::features::map_features::{dtos as features_dtos, handlers as features_handlers};
use crate::features::tags::handlers as tags_handlers;
use crate::shared::geo::{Address, Coordinates, DistanceUnit, SortOrder};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Locations
        locations_handlers::list_locations,
        locations_handlers::nearby_locations,
        locations_handlers::get_location,
        locations_handlers::create_location,
        locations_handlers::update_location,
        locations_handlers::delete_location,
        // Map features (public)
        features_handlers::nearby_features,
        features_handlers::get_feature,
        // Geolocation
        geolocation_handlers::get_coordinates,
        geolocation_handlers::get_address,
        // Tags
        tags_handlers::list_tags,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Coordinates,
            Address,
            DistanceUnit,
            SortOrder,
            ApiResponse<Coordinates>,
            ApiResponse<Address>,
            ApiResponse<Vec<String>>,
            // Locations
            locations_models::Image,
            locations_models::Location,
            locations_dtos::LocationRequestDto,
            locations_dtos::DeleteLocationResponseDto,
            ApiResponse<locations_models::Location>,
            ApiResponse<Vec<locations_models::Location>>,
            ApiResponse<locations_dtos::DeleteLocationResponseDto>,
            // Map features
            features_dtos::StateDto,
            features_dtos::CountryDto,
            features_dtos::FeaturePropertiesDto,
            features_dtos::PointGeometryDto,
            features_dtos::LocationFeatureDto,
            features_dtos::LocationFeatureCollectionDto,
            ApiResponse<features_dtos::LocationFeatureDto>,
            ApiResponse<features_dtos::LocationFeatureCollectionDto>,
        )
    ),
    tags(
        (name = "locations", description = "Location catalog management"),
        (name = "features", description = "Visible locations as GeoJSON for the public map"),
        (name = "geolocation", description = "Address and coordinate lookups"),
        (name = "tags", description = "Location tag vocabulary"),
    ),
    info(
        title = "Location Finder API",
        version = "0.1.0",
        description = "API documentation for Location Finder",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
