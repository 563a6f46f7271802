//! Conversion between map viewport pixels and ground distance.
//!
//! Based on the slippy-map resolution tables
//! (https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames#Resolution_and_Scale)
//! and https://docs.mapbox.com/help/glossary/zoom-level/.

use crate::shared::geo::DistanceUnit;

/// Effective circumference at zoom 0 for the 512px tile scheme, in kilometers
pub const TILE_CIRCUMFERENCE_KM: f64 = 39135.742;

/// Effective circumference at zoom 0 for the 512px tile scheme, in miles
pub const TILE_CIRCUMFERENCE_MI: f64 = 24317.81514;

/// Width of a single map tile in pixels
pub const TILE_WIDTH_IN_PX: f64 = 512.0;

/// Deepest zoom level map clients request
pub const MAX_ZOOM_LEVEL: u32 = 24;

/// Ground-distance dimensions of a map viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportDimensions {
    pub width: f64,
    pub height: f64,
}

fn tile_circumference(unit: DistanceUnit) -> f64 {
    match unit {
        DistanceUnit::Km => TILE_CIRCUMFERENCE_KM,
        DistanceUnit::Mi => TILE_CIRCUMFERENCE_MI,
        DistanceUnit::M => TILE_CIRCUMFERENCE_KM * 1000.0,
        DistanceUnit::Ft => TILE_CIRCUMFERENCE_MI * 5280.0,
    }
}

/// Horizontal distance spanned by one tile at `zoom` around `latitude` (degrees).
///
/// Latitude is expected inside the Web Mercator range (about ±85.05°).
pub fn tile_distance(zoom: u32, latitude: f64, unit: DistanceUnit) -> f64 {
    let latitude_in_radians = latitude * (std::f64::consts::PI / 180.0);
    (tile_circumference(unit) * latitude_in_radians.cos()) / 2f64.powi(zoom as i32)
}

/// Distance covered by a single pixel at `zoom` around `latitude`
pub fn distance_per_pixel(zoom: u32, latitude: f64, unit: DistanceUnit) -> f64 {
    tile_distance(zoom, latitude, unit) / TILE_WIDTH_IN_PX
}

/// Convert a viewport's pixel size into a search box measured in `unit`
pub fn viewport_dimensions(
    zoom: u32,
    latitude: f64,
    width_px: u32,
    height_px: u32,
    unit: DistanceUnit,
) -> ViewportDimensions {
    let per_pixel = distance_per_pixel(zoom, latitude, unit);
    ViewportDimensions {
        width: width_px as f64 * per_pixel,
        height: height_px as f64 * per_pixel,
    }
}
