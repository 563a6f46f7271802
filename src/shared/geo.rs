use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Earth radius used by the geo index when measuring distances between members.
pub const EARTH_RADIUS_METERS: f64 = 6_372_797.560856;

/// Latitude bound of the geo index (the Web Mercator limit enforced by Redis)
pub const GEO_INDEX_MAX_LATITUDE: f64 = 85.05112878;

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    #[schema(example = 47.6)]
    pub latitude: f64,
    #[schema(example = -122.3)]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and inside their geographic ranges
    pub fn validate(&self) -> Result<(), String> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!(
                "latitude must be between -90 and 90, got {}",
                self.latitude
            ));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!(
                "longitude must be between -180 and 180, got {}",
                self.longitude
            ));
        }
        Ok(())
    }

    /// Like [`Coordinates::validate`], but also within the latitudes the geo index can store
    pub fn validate_indexable(&self) -> Result<(), String> {
        self.validate()?;
        if self.latitude.abs() > GEO_INDEX_MAX_LATITUDE {
            return Err(format!(
                "latitude must be between -{limit} and {limit} to be indexed, got {}",
                self.latitude,
                limit = GEO_INDEX_MAX_LATITUDE
            ));
        }
        Ok(())
    }
}

/// Postal address returned by reverse geocoding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Single-line form used as free-text geocoding input
    pub fn to_query(&self) -> String {
        format!(
            "{} {}, {} {}",
            self.street_address, self.city, self.state, self.zip
        )
    }
}

/// Units accepted by proximity searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    M,
    #[default]
    Km,
    Ft,
    Mi,
}

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::M => "m",
            DistanceUnit::Km => "km",
            DistanceUnit::Ft => "ft",
            DistanceUnit::Mi => "mi",
        }
    }

    /// Number of meters in one unit
    pub fn meters(&self) -> f64 {
        match self {
            DistanceUnit::M => 1.0,
            DistanceUnit::Km => 1000.0,
            DistanceUnit::Ft => 0.3048,
            DistanceUnit::Mi => 1609.34,
        }
    }

    pub fn to_meters(&self, value: f64) -> f64 {
        value * self.meters()
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering of proximity results by distance from the search center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Great-circle distance in meters between two points
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_METERS * c
}
