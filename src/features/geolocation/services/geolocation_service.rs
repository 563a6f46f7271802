use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::modules::geocoding::Geocoder;
use crate::shared::geo::{Address, Coordinates};

/// Service for address and coordinate lookups
pub struct GeolocationService {
    geocoder: Arc<dyn Geocoder>,
}

impl GeolocationService {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    pub async fn coordinates(&self, address: &Address) -> Result<Coordinates> {
        let query = address.to_query();
        self.geocoder.geocode(&query).await?.ok_or_else(|| {
            tracing::warn!("No coordinates found for address: {}", query);
            AppError::NotFound("No coordinates were found for the given address".to_string())
        })
    }

    pub async fn address(&self, coordinates: Coordinates) -> Result<Address> {
        coordinates.validate().map_err(AppError::Validation)?;

        self.geocoder
            .reverse_geocode(coordinates)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No address was found for the given coordinates".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{sample_address, FixedGeocoder};

    #[tokio::test]
    async fn test_lookups() {
        let point = Coordinates::new(47.6, -122.3);
        let service = GeolocationService::new(Arc::new(FixedGeocoder(Some(point))));

        assert_eq!(service.coordinates(&sample_address()).await.unwrap(), point);
        assert_eq!(service.address(point).await.unwrap(), sample_address());
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let service = GeolocationService::new(Arc::new(FixedGeocoder(None)));

        assert!(matches!(
            service.coordinates(&sample_address()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.address(Coordinates::new(0.0, 0.0)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reverse_rejects_out_of_range() {
        let service = GeolocationService::new(Arc::new(FixedGeocoder(None)));
        assert!(matches!(
            service.address(Coordinates::new(0.0, 200.0)).await,
            Err(AppError::Validation(_))
        ));
    }
}
