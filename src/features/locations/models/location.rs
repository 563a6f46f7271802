use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::geo::{Coordinates, DistanceUnit, SortOrder};

/// Image attached to a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Stored filename
    pub filename: String,
    /// Filename as uploaded by the user
    pub original_filename: String,
    /// An empty description is stored the same way as a missing one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A geotagged point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub images: Vec<Image>,
    pub tags: Vec<String>,
    /// Whether the location is visible on the public site
    pub display_on_site: bool,
}

/// Parameters of a proximity search.
///
/// Exactly one of `radius` or the `width`/`height` pair must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyParams {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub unit: DistanceUnit,
    pub sort: SortOrder,
}

impl NearbyParams {
    #[cfg(test)]
    pub fn radius(center: Coordinates, radius: f64, unit: DistanceUnit) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            radius: Some(radius),
            width: None,
            height: None,
            unit,
            sort: SortOrder::Asc,
        }
    }

    pub fn bounding_box(center: Coordinates, width: f64, height: f64, unit: DistanceUnit) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            radius: None,
            width: Some(width),
            height: Some(height),
            unit,
            sort: SortOrder::Asc,
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}
