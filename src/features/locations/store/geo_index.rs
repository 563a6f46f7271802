use crate::features::locations::models::NearbyParams;
use crate::features::locations::store::error::{LocationStoreError, StoreResult};
use crate::features::locations::store::keys::KeyNamespace;
use crate::modules::kv::{GeoShape, KvError, StoreConnection};
use crate::shared::geo::{Coordinates, DistanceUnit, SortOrder};

const EXCLUSIVE_SHAPE_MESSAGE: &str = "provide only radius or height/width";

impl NearbyParams {
    /// Validate the query and resolve which search it describes
    pub fn shape(&self) -> StoreResult<GeoShape> {
        self.center()
            .validate_indexable()
            .map_err(LocationStoreError::Validation)?;

        let shape = match (self.radius, self.width, self.height) {
            (Some(radius), None, None) => GeoShape::Radius {
                radius,
                unit: self.unit,
            },
            (None, Some(width), Some(height)) => GeoShape::Box {
                width,
                height,
                unit: self.unit,
            },
            _ => {
                return Err(LocationStoreError::Validation(
                    EXCLUSIVE_SHAPE_MESSAGE.to_string(),
                ))
            }
        };

        let positive = |d: f64| d.is_finite() && d > 0.0;
        let valid = match shape {
            GeoShape::Radius { radius, .. } => positive(radius),
            GeoShape::Box { width, height, .. } => positive(width) && positive(height),
        };
        if !valid {
            return Err(LocationStoreError::Validation(
                "search dimensions must be positive numbers".to_string(),
            ));
        }

        Ok(shape)
    }
}

/// Spatial index over location ids, kept next to the primary hashes
#[derive(Debug, Clone)]
pub struct GeoIndex {
    key: String,
}

impl GeoIndex {
    pub fn new(keys: &KeyNamespace) -> Self {
        Self {
            key: keys.location_geo_key(),
        }
    }

    /// Insert a member or move it to new coordinates
    pub async fn upsert(
        &self,
        conn: &mut dyn StoreConnection,
        id: &str,
        coordinates: Coordinates,
    ) -> Result<(), KvError> {
        conn.geo_add(&self.key, id, coordinates).await
    }

    /// Remove a member; a missing member is not an error
    pub async fn remove_member(
        &self,
        conn: &mut dyn StoreConnection,
        id: &str,
    ) -> Result<bool, KvError> {
        conn.geo_remove(&self.key, id).await
    }

    pub async fn search_radius(
        &self,
        conn: &mut dyn StoreConnection,
        center: Coordinates,
        radius: f64,
        unit: DistanceUnit,
        sort: SortOrder,
    ) -> Result<Vec<String>, KvError> {
        conn.geo_search(&self.key, center, GeoShape::Radius { radius, unit }, sort)
            .await
    }

    pub async fn search_box(
        &self,
        conn: &mut dyn StoreConnection,
        center: Coordinates,
        width: f64,
        height: f64,
        unit: DistanceUnit,
        sort: SortOrder,
    ) -> Result<Vec<String>, KvError> {
        conn.geo_search(
            &self.key,
            center,
            GeoShape::Box {
                width,
                height,
                unit,
            },
            sort,
        )
        .await
    }

    /// Run the search `params` describe; ids come back in index order
    pub async fn search(
        &self,
        conn: &mut dyn StoreConnection,
        params: &NearbyParams,
    ) -> StoreResult<Vec<String>> {
        let ids = match params.shape()? {
            GeoShape::Radius { radius, unit } => {
                self.search_radius(conn, params.center(), radius, unit, params.sort)
                    .await?
            }
            GeoShape::Box {
                width,
                height,
                unit,
            } => {
                self.search_box(conn, params.center(), width, height, unit, params.sort)
                    .await?
            }
        };
        Ok(ids)
    }
}
