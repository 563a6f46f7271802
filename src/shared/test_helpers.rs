use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::locations::models::Location;
use crate::features::locations::store::{KeyNamespace, LocationRepository};
use crate::modules::geocoding::Geocoder;
use crate::modules::kv::MemoryStore;
use crate::shared::geo::{Address, Coordinates};

/// Geocoder that answers every lookup with the same point
pub struct FixedGeocoder(pub Option<Coordinates>);

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, _location_text: &str) -> Result<Option<Coordinates>> {
        Ok(self.0)
    }

    async fn reverse_geocode(&self, _coordinates: Coordinates) -> Result<Option<Address>> {
        Ok(self.0.map(|_| sample_address()))
    }
}

pub fn sample_address() -> Address {
    Address {
        street_address: "123 Main St.".to_string(),
        city: "Anytown".to_string(),
        state: "WA".to_string(),
        zip: "12345".to_string(),
    }
}

pub fn sample_location(id: &str, latitude: f64, longitude: f64) -> Location {
    Location {
        id: id.to_string(),
        name: format!("Location {}", id),
        street_address: "123 Main St.".to_string(),
        city: "Anytown".to_string(),
        state: "WA".to_string(),
        zip: "12345".to_string(),
        coordinates: Coordinates::new(latitude, longitude),
        description: "A nice place.".to_string(),
        images: vec![],
        tags: vec![],
        display_on_site: true,
    }
}

/// Repository over a fresh in-memory store under the "test" prefix
pub fn memory_repository() -> (Arc<MemoryStore>, Arc<LocationRepository>) {
    let store = Arc::new(MemoryStore::new());
    let repository = Arc::new(LocationRepository::new(
        store.clone(),
        KeyNamespace::new("test"),
    ));
    (store, repository)
}
