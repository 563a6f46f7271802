use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::locations::models::{Image, NearbyParams};
use crate::shared::geo::{Address, Coordinates, DistanceUnit, SortOrder};

/// Request DTO for creating or replacing a location
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequestDto {
    /// Generated when omitted on create
    #[validate(regex(
        path = "*crate::shared::validation::LOCATION_ID_REGEX",
        message = "Id may only contain letters, digits, hyphens and underscores"
    ))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Street address is required"))]
    pub street_address: String,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,

    #[validate(length(min = 1, message = "Zip is required"))]
    pub zip: String,

    /// Resolved from the address when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub images: Vec<Image>,

    /// Ordered, without repeats
    #[validate(custom(function = "crate::shared::validation::validate_unique_tags"))]
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub display_on_site: bool,
}

impl LocationRequestDto {
    pub fn address(&self) -> Address {
        Address {
            street_address: self.street_address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip: self.zip.clone(),
        }
    }
}

/// Query params for proximity search
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearbyLocationsQuery {
    /// Latitude of the search center
    pub latitude: f64,
    /// Longitude of the search center
    pub longitude: f64,
    /// Search radius; mutually exclusive with width/height
    pub radius: Option<f64>,
    /// Box width; requires height
    pub width: Option<f64>,
    /// Box height; requires width
    pub height: Option<f64>,
    /// Unit for radius/width/height (default: km)
    #[serde(default)]
    pub unit_of_distance: DistanceUnit,
    /// Order by distance from the center (default: ASC)
    #[serde(default)]
    pub sort: SortOrder,
}

impl From<NearbyLocationsQuery> for NearbyParams {
    fn from(q: NearbyLocationsQuery) -> Self {
        Self {
            latitude: q.latitude,
            longitude: q.longitude,
            radius: q.radius,
            width: q.width,
            height: q.height,
            unit: q.unit_of_distance,
            sort: q.sort,
        }
    }
}

/// Response DTO for a delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteLocationResponseDto {
    pub id: String,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> LocationRequestDto {
        serde_json::from_value(serde_json::json!({
            "name": "Depot",
            "streetAddress": "123 Main St.",
            "city": "Anytown",
            "state": "WA",
            "zip": "12345"
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let dto = dto();
        assert_eq!(dto.id, None);
        assert_eq!(dto.coordinates, None);
        assert!(dto.images.is_empty());
        assert!(dto.tags.is_empty());
        assert!(!dto.display_on_site);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_id() {
        let mut dto = dto();
        dto.id = Some("a:b".to_string());
        assert!(dto.validate().is_err());

        dto.id = Some("loc-1_a".to_string());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_required_fields() {
        let mut dto = dto();
        dto.city = String::new();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_tags() {
        let mut dto = dto();
        dto.tags = vec!["parking".to_string(), "parking".to_string()];
        assert!(dto.validate().is_err());

        dto.tags = vec!["parking".to_string(), "water".to_string()];
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_address_query() {
        assert_eq!(dto().address().to_query(), "123 Main St. Anytown, WA 12345");
    }

    #[test]
    fn test_nearby_query_defaults() {
        let query: NearbyLocationsQuery = serde_json::from_value(serde_json::json!({
            "latitude": 47.6,
            "longitude": -122.3,
            "radius": 2.0
        }))
        .unwrap();
        let params = NearbyParams::from(query);
        assert_eq!(params.unit, DistanceUnit::Km);
        assert_eq!(params.sort, SortOrder::Asc);
        assert_eq!(params.radius, Some(2.0));
        assert_eq!(params.width, None);
    }
}
