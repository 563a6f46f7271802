use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::locations::models::NearbyParams;
use crate::features::locations::store::LocationRepository;
use crate::features::map_features::dtos::{
    LocationFeatureCollectionDto, LocationFeatureDto, NearbyFeaturesQuery,
};
use crate::shared::geo::{Coordinates, DistanceUnit, SortOrder};
use crate::shared::map_utils::{viewport_dimensions, MAX_ZOOM_LEVEL};

/// Service exposing publicly visible locations as GeoJSON
pub struct FeatureService {
    repository: Arc<LocationRepository>,
}

impl FeatureService {
    pub fn new(repository: Arc<LocationRepository>) -> Self {
        Self { repository }
    }

    /// Visible locations inside the map viewport, nearest first
    pub async fn nearby(&self, query: NearbyFeaturesQuery) -> Result<LocationFeatureCollectionDto> {
        if !matches!(query.unit_of_distance, DistanceUnit::Mi | DistanceUnit::Km) {
            return Err(AppError::Validation(
                "unitOfDistance must be \"mi\" or \"km\"".to_string(),
            ));
        }
        if query.zoomlevel > MAX_ZOOM_LEVEL {
            return Err(AppError::Validation(format!(
                "zoomlevel must be at most {}",
                MAX_ZOOM_LEVEL
            )));
        }

        let dimensions = viewport_dimensions(
            query.zoomlevel,
            query.latitude,
            query.map_width_in_px,
            query.map_height_in_px,
            query.unit_of_distance,
        );
        tracing::debug!(
            "Viewport at zoom {} spans {:.3}x{:.3} {}",
            query.zoomlevel,
            dimensions.width,
            dimensions.height,
            query.unit_of_distance
        );

        let params = NearbyParams::bounding_box(
            Coordinates::new(query.latitude, query.longitude),
            dimensions.width,
            dimensions.height,
            query.unit_of_distance,
        )
        .with_sort(SortOrder::Asc);

        let features = self
            .repository
            .find_nearby(&params)
            .await?
            .into_iter()
            .filter(|l| l.display_on_site)
            .map(LocationFeatureDto::from)
            .collect();

        Ok(LocationFeatureCollectionDto::new(features))
    }

    /// A single visible location; hidden locations are reported as missing
    pub async fn get(&self, id: &str) -> Result<LocationFeatureDto> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|l| l.display_on_site)
            .map(LocationFeatureDto::from)
            .ok_or_else(|| AppError::NotFound("Feature not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{memory_repository, sample_location};

    fn query(unit: DistanceUnit) -> NearbyFeaturesQuery {
        NearbyFeaturesQuery {
            latitude: 47.6,
            longitude: -122.3,
            unit_of_distance: unit,
            zoomlevel: 14,
            map_width_in_px: 1024,
            map_height_in_px: 768,
        }
    }

    async fn seeded() -> FeatureService {
        let (_store, repository) = memory_repository();
        repository
            .insert(&sample_location("near", 47.601, -122.3))
            .await
            .unwrap();
        repository
            .insert(&sample_location("center", 47.6, -122.3))
            .await
            .unwrap();

        let mut hidden = sample_location("hidden", 47.6005, -122.3);
        hidden.display_on_site = false;
        repository.insert(&hidden).await.unwrap();

        // Well outside a zoom 14 viewport
        repository
            .insert(&sample_location("far", 48.5, -122.3))
            .await
            .unwrap();

        FeatureService::new(repository)
    }

    #[tokio::test]
    async fn test_nearby_returns_visible_features_in_order() {
        let service = seeded().await;

        let collection = service.nearby(query(DistanceUnit::Km)).await.unwrap();
        assert_eq!(collection.kind, "FeatureCollection");
        let ids: Vec<&str> = collection.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["center", "near"]);

        let in_miles = service.nearby(query(DistanceUnit::Mi)).await.unwrap();
        assert_eq!(in_miles.features.len(), 2);
    }

    #[tokio::test]
    async fn test_nearby_rejects_bad_queries() {
        let service = seeded().await;

        assert!(matches!(
            service.nearby(query(DistanceUnit::Ft)).await,
            Err(AppError::Validation(_))
        ));

        let mut too_deep = query(DistanceUnit::Km);
        too_deep.zoomlevel = 40;
        assert!(matches!(
            service.nearby(too_deep).await,
            Err(AppError::Validation(_))
        ));

        let mut empty_viewport = query(DistanceUnit::Km);
        empty_viewport.map_width_in_px = 0;
        assert!(matches!(
            service.nearby(empty_viewport).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_hides_unpublished() {
        let service = seeded().await;

        let feature = service.get("center").await.unwrap();
        assert_eq!(feature.geometry.coordinates, [-122.3, 47.6]);

        assert!(matches!(
            service.get("hidden").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.get("missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
