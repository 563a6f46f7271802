//! Geocoding providers
//!
//! Forward geocoding turns free text into coordinates; reverse geocoding turns
//! coordinates into a postal address. The provider is chosen once at startup.

mod mapbox;
mod nominatim;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::{GeocoderConfig, GeocoderProvider};
use crate::core::error::Result;
use crate::shared::geo::{Address, Coordinates};

pub use mapbox::MapboxGeocoder;
pub use nominatim::NominatimGeocoder;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates for a free-text location, `None` when nothing matched
    async fn geocode(&self, location_text: &str) -> Result<Option<Coordinates>>;

    /// Address at the given coordinates, `None` when nothing matched
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Option<Address>>;
}

/// Build the configured geocoding provider
pub fn create_geocoder(config: &GeocoderConfig) -> std::result::Result<Arc<dyn Geocoder>, String> {
    match config.provider {
        GeocoderProvider::Mapbox => {
            let token = config
                .mapbox_access_token
                .clone()
                .ok_or_else(|| "MAPBOX_ACCESS_TOKEN is required for the mapbox geocoder".to_string())?;
            Ok(Arc::new(MapboxGeocoder::new(
                config.mapbox_geocode_url.clone(),
                token,
            )?))
        }
        GeocoderProvider::Nominatim => Ok(Arc::new(NominatimGeocoder::new(
            config.nominatim_url.clone(),
        )?)),
    }
}
