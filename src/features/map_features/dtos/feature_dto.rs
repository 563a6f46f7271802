//! GeoJSON shapes served to the public map

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::locations::models::{Image, Location};
use crate::shared::geo::{Coordinates, DistanceUnit};

const FEATURE_TYPE: &str = "Feature";
const FEATURE_COLLECTION_TYPE: &str = "FeatureCollection";
const POINT_TYPE: &str = "Point";

const COUNTRY_NAME: &str = "United States";
const COUNTRY_CODE: &str = "US";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StateDto {
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryDto {
    pub name: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePropertiesDto {
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: StateDto,
    pub postal_code: String,
    pub country: CountryDto,
    pub coordinates: Coordinates,
    pub images: Vec<Image>,
    pub tags: Vec<String>,
}

/// GeoJSON point; coordinates are `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PointGeometryDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationFeatureDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub geometry: PointGeometryDto,
    pub properties: FeaturePropertiesDto,
}

impl From<Location> for LocationFeatureDto {
    fn from(l: Location) -> Self {
        Self {
            kind: FEATURE_TYPE.to_string(),
            id: l.id,
            geometry: PointGeometryDto {
                kind: POINT_TYPE.to_string(),
                coordinates: [l.coordinates.longitude, l.coordinates.latitude],
            },
            properties: FeaturePropertiesDto {
                name: l.name,
                description: l.description,
                address: l.street_address,
                city: l.city,
                state: StateDto {
                    name: String::new(),
                    abbreviation: l.state,
                },
                postal_code: l.zip,
                country: CountryDto {
                    name: COUNTRY_NAME.to_string(),
                    country_code: COUNTRY_CODE.to_string(),
                },
                coordinates: l.coordinates,
                images: l.images,
                tags: l.tags,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationFeatureCollectionDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<LocationFeatureDto>,
}

impl LocationFeatureCollectionDto {
    pub fn new(features: Vec<LocationFeatureDto>) -> Self {
        Self {
            kind: FEATURE_COLLECTION_TYPE.to_string(),
            features,
        }
    }
}

/// Query params describing the visible map viewport
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearbyFeaturesQuery {
    /// Latitude of the map center
    pub latitude: f64,
    /// Longitude of the map center
    pub longitude: f64,
    /// "mi" or "km"
    pub unit_of_distance: DistanceUnit,
    /// Map zoom level
    pub zoomlevel: u32,
    /// Viewport width in pixels
    pub map_width_in_px: u32,
    /// Viewport height in pixels
    pub map_height_in_px: u32,
}
