use std::sync::Arc;

use crate::features::locations::models::{Location, NearbyParams};
use crate::features::locations::store::codec;
use crate::features::locations::store::error::{LocationStoreError, StoreResult};
use crate::features::locations::store::geo_index::GeoIndex;
use crate::features::locations::store::keys::KeyNamespace;
use crate::modules::kv::{HashRecord, KeyValueStore, KvError, StoreConnection};

/// Undo step applied when a multi-index write fails part way
enum Compensation<'a> {
    DeleteHash,
    RestoreHash(&'a HashRecord),
    RemoveFromIdSet,
}

fn duplicate_tag(tags: &[String]) -> Option<&str> {
    tags.iter()
        .enumerate()
        .find(|(i, tag)| tags[..*i].contains(tag))
        .map(|(_, tag)| tag.as_str())
}

/// Persists locations as flat hashes plus an id set and a geo index.
///
/// Every call acquires its own backend connection and releases it on return.
/// Writes touch three keys with separate commands; when one fails after an
/// earlier one succeeded, the repository undoes what it can and reports
/// [`LocationStoreError::InconsistentState`].
pub struct LocationRepository {
    store: Arc<dyn KeyValueStore>,
    keys: KeyNamespace,
    geo: GeoIndex,
}

impl LocationRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: KeyNamespace) -> Self {
        let geo = GeoIndex::new(&keys);
        Self { store, keys, geo }
    }

    fn validate_for_write(location: &Location) -> StoreResult<()> {
        if location.id.trim().is_empty() {
            return Err(LocationStoreError::Validation(
                "location id must not be empty".to_string(),
            ));
        }
        if let Some(tag) = duplicate_tag(&location.tags) {
            return Err(LocationStoreError::Validation(format!(
                "tag '{}' appears more than once",
                tag
            )));
        }
        location
            .coordinates
            .validate_indexable()
            .map_err(LocationStoreError::Validation)
    }

    /// Store a new location; returns its hash key
    pub async fn insert(&self, location: &Location) -> StoreResult<String> {
        Self::validate_for_write(location)?;

        let hash_key = self.keys.location_hash_key(&location.id);
        let mut conn = self.store.acquire().await?;

        if conn.key_exists(&hash_key).await? {
            return Err(LocationStoreError::DuplicateEntity(location.id.clone()));
        }

        conn.hash_set(&hash_key, &codec::flatten(location)).await?;

        if let Err(e) = conn
            .set_add(&self.keys.location_ids_key(), &hash_key)
            .await
        {
            return Err(self
                .compensate(conn.as_mut(), "insert", &location.id, e, &[Compensation::DeleteHash])
                .await);
        }

        if let Err(e) = self
            .geo
            .upsert(conn.as_mut(), &location.id, location.coordinates)
            .await
        {
            return Err(self
                .compensate(
                    conn.as_mut(),
                    "insert",
                    &location.id,
                    e,
                    &[Compensation::RemoveFromIdSet, Compensation::DeleteHash],
                )
                .await);
        }

        tracing::debug!("Inserted new location {}", hash_key);
        Ok(hash_key)
    }

    /// Replace an existing location; returns its hash key.
    ///
    /// Fails with [`LocationStoreError::NotFound`] when the id is not stored.
    pub async fn update(&self, location: &Location) -> StoreResult<String> {
        Self::validate_for_write(location)?;

        let hash_key = self.keys.location_hash_key(&location.id);
        let mut conn = self.store.acquire().await?;

        let existing = conn.hash_get_all(&hash_key).await?;
        if existing.is_empty() {
            return Err(LocationStoreError::NotFound(location.id.clone()));
        }

        let replacement = codec::flatten(location);
        let stale = codec::stale_fields(&existing, &replacement);

        conn.hash_delete_fields(&hash_key, &stale).await?;

        let restore = [Compensation::RestoreHash(&existing)];

        if let Err(e) = conn.hash_set(&hash_key, &replacement).await {
            return Err(self
                .compensate(conn.as_mut(), "update", &location.id, e, &restore)
                .await);
        }

        if let Err(e) = conn
            .set_add(&self.keys.location_ids_key(), &hash_key)
            .await
        {
            return Err(self
                .compensate(conn.as_mut(), "update", &location.id, e, &restore)
                .await);
        }

        if let Err(e) = self
            .geo
            .upsert(conn.as_mut(), &location.id, location.coordinates)
            .await
        {
            return Err(self
                .compensate(conn.as_mut(), "update", &location.id, e, &restore)
                .await);
        }

        tracing::debug!(
            "Updated location {} ({} stale fields removed)",
            hash_key,
            stale.len()
        );
        Ok(hash_key)
    }

    /// Delete a location; returns whether a stored record was removed.
    ///
    /// Once the primary hash is gone, failures clearing the id set or geo
    /// index are logged and swallowed.
    pub async fn remove(&self, id: &str) -> StoreResult<bool> {
        let hash_key = self.keys.location_hash_key(id);
        let mut conn = self.store.acquire().await?;

        let removed = conn.delete_key(&hash_key).await?;

        if let Err(e) = conn
            .set_remove(&self.keys.location_ids_key(), &hash_key)
            .await
        {
            tracing::warn!("Failed to remove {} from location id set: {}", id, e);
        }

        if let Err(e) = self.geo.remove_member(conn.as_mut(), id).await {
            tracing::warn!("Failed to remove {} from location geo index: {}", id, e);
        }

        if removed {
            tracing::debug!("Removed location {}", hash_key);
        }
        Ok(removed)
    }

    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Location>> {
        let hash_key = self.keys.location_hash_key(id);
        let mut conn = self.store.acquire().await?;

        let record = conn.hash_get_all(&hash_key).await?;
        codec::remap(&record)
    }

    /// Every stored location, in no particular order.
    ///
    /// Loads the whole id set; prefer [`Self::find_page`] for large catalogs.
    pub async fn find_all(&self) -> StoreResult<Vec<Location>> {
        let mut conn = self.store.acquire().await?;

        let hash_keys = conn.set_members(&self.keys.location_ids_key()).await?;
        self.fetch_records(conn.as_mut(), &hash_keys).await
    }

    /// A page of locations ordered by hash key, plus the total count
    pub async fn find_page(&self, offset: usize, limit: usize) -> StoreResult<(Vec<Location>, usize)> {
        let mut conn = self.store.acquire().await?;

        let mut hash_keys = conn.set_members(&self.keys.location_ids_key()).await?;
        hash_keys.sort();
        let total = hash_keys.len();

        let page: Vec<String> = hash_keys.into_iter().skip(offset).take(limit).collect();
        let locations = self.fetch_records(conn.as_mut(), &page).await?;

        Ok((locations, total))
    }

    /// Locations matching a radius or box search, in geo index order
    pub async fn find_nearby(&self, params: &NearbyParams) -> StoreResult<Vec<Location>> {
        // Reject malformed queries before touching the backend
        params.shape()?;

        let mut conn = self.store.acquire().await?;

        let ids = self.geo.search(conn.as_mut(), params).await?;
        let hash_keys: Vec<String> = ids
            .iter()
            .map(|id| self.keys.location_hash_key(id))
            .collect();

        self.fetch_records(conn.as_mut(), &hash_keys).await
    }

    /// Pipelined read of `hash_keys`, keeping their order and skipping absent records
    async fn fetch_records(
        &self,
        conn: &mut dyn StoreConnection,
        hash_keys: &[String],
    ) -> StoreResult<Vec<Location>> {
        let records = conn.hash_get_all_batch(hash_keys).await?;

        let mut locations = Vec::with_capacity(records.len());
        for (hash_key, record) in hash_keys.iter().zip(records.iter()) {
            match codec::remap(record)? {
                Some(location) => locations.push(location),
                None => tracing::warn!(
                    "Index entry for location {} has no stored record",
                    self.keys
                        .location_id_from_hash_key(hash_key)
                        .unwrap_or(hash_key)
                ),
            }
        }

        Ok(locations)
    }

    /// Run undo steps after a failed write and build the error to return
    async fn compensate(
        &self,
        conn: &mut dyn StoreConnection,
        operation: &'static str,
        id: &str,
        source: KvError,
        steps: &[Compensation<'_>],
    ) -> LocationStoreError {
        tracing::error!("{} of location {} failed: {}", operation, id, source);

        let hash_key = self.keys.location_hash_key(id);
        let mut rolled_back = true;

        for step in steps {
            let result = match step {
                Compensation::DeleteHash => conn.delete_key(&hash_key).await.map(|_| ()),
                Compensation::RestoreHash(previous) => {
                    match conn.delete_key(&hash_key).await {
                        Ok(_) => conn.hash_set(&hash_key, previous).await,
                        Err(e) => Err(e),
                    }
                }
                Compensation::RemoveFromIdSet => conn
                    .set_remove(&self.keys.location_ids_key(), &hash_key)
                    .await
                    .map(|_| ()),
            };

            if let Err(e) = result {
                tracing::error!(
                    "Failed to roll back {} of location {}: {}",
                    operation,
                    id,
                    e
                );
                rolled_back = false;
            }
        }

        LocationStoreError::InconsistentState {
            operation,
            id: id.to_string(),
            rolled_back,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::locations::models::Image;
    use crate::modules::kv::MemoryStore;
    use crate::shared::geo::{Coordinates, DistanceUnit, SortOrder};

    fn setup() -> (Arc<MemoryStore>, LocationRepository) {
        let store = Arc::new(MemoryStore::new());
        let repository = LocationRepository::new(store.clone(), KeyNamespace::new("test"));
        (store, repository)
    }

    fn location(id: &str, latitude: f64, longitude: f64) -> Location {
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

    fn depot() -> Location {
        Location {
            name: "Depot".to_string(),
            images: vec![Image {
                filename: "f1".to_string(),
                original_filename: "o1".to_string(),
                description: None,
            }],
            tags: vec!["parking".to_string()],
            ..location("loc1", 47.6, -122.3)
        }
    }

    async fn raw_hash(store: &MemoryStore, key: &str) -> HashRecord {
        let mut conn = store.acquire().await.unwrap();
        conn.hash_get_all(key).await.unwrap()
    }

    async fn id_set(store: &MemoryStore) -> Vec<String> {
        let mut conn = store.acquire().await.unwrap();
        conn.set_members("test:locations:ids").await.unwrap()
    }

    async fn geo_members(store: &MemoryStore) -> Vec<String> {
        let mut conn = store.acquire().await.unwrap();
        conn.geo_search(
            "test:locations:geo",
            Coordinates::new(0.0, 0.0),
            crate::modules::kv::GeoShape::Radius {
                radius: 20_000.0,
                unit: DistanceUnit::Km,
            },
            SortOrder::Asc,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_depot() {
        let (_store, repository) = setup();

        let key = repository.insert(&depot()).await.unwrap();
        assert_eq!(key, "test:locations:info:loc1");

        let found = repository.find_by_id("loc1").await.unwrap();
        assert_eq!(found, Some(depot()));

        let center = Coordinates::new(47.6, -122.3);
        let by_radius = repository
            .find_nearby(&NearbyParams::radius(center, 1.0, DistanceUnit::Km))
            .await
            .unwrap();
        assert!(by_radius.iter().any(|l| l.id == "loc1"));

        let by_box = repository
            .find_nearby(&NearbyParams::bounding_box(
                center,
                0.01,
                0.01,
                DistanceUnit::Km,
            ))
            .await
            .unwrap();
        assert!(by_box.iter().any(|l| l.id == "loc1"));
    }

    #[tokio::test]
    async fn test_insert_duplicate_writes_nothing() {
        let (store, repository) = setup();
        repository.insert(&depot()).await.unwrap();
        let before = raw_hash(&store, "test:locations:info:loc1").await;

        let mut changed = depot();
        changed.name = "Changed".to_string();
        changed.coordinates = Coordinates::new(10.0, 10.0);

        let result = repository.insert(&changed).await;
        assert!(matches!(
            result,
            Err(LocationStoreError::DuplicateEntity(ref id)) if id == "loc1"
        ));
        assert_eq!(raw_hash(&store, "test:locations:info:loc1").await, before);

        let near_old = repository
            .find_nearby(&NearbyParams::radius(
                Coordinates::new(47.6, -122.3),
                1.0,
                DistanceUnit::Km,
            ))
            .await
            .unwrap();
        assert_eq!(near_old.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_coordinates() {
        let (store, repository) = setup();
        let result = repository.insert(&location("bad", 95.0, 0.0)).await;
        assert!(matches!(result, Err(LocationStoreError::Validation(_))));
        assert!(id_set(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_latitude_outside_geo_index() {
        let (store, repository) = setup();
        let result = repository.insert(&location("arctic", 89.0, 0.0)).await;
        assert!(matches!(result, Err(LocationStoreError::Validation(_))));
        assert!(id_set(&store).await.is_empty());
        assert_eq!(repository.find_by_id("arctic").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_rejects_repeated_tags() {
        let (store, repository) = setup();
        let mut loc = depot();
        loc.tags = vec!["parking".to_string(), "parking".to_string()];

        let result = repository.insert(&loc).await;
        assert!(matches!(result, Err(LocationStoreError::Validation(_))));
        assert!(id_set(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_false() {
        let (_store, repository) = setup();
        assert!(!repository.remove("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_clears_all_indexes() {
        let (store, repository) = setup();
        repository.insert(&depot()).await.unwrap();

        assert!(repository.remove("loc1").await.unwrap());
        assert_eq!(repository.find_by_id("loc1").await.unwrap(), None);
        assert!(id_set(&store).await.is_empty());
        assert!(geo_members(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_swallows_secondary_index_failures() {
        let (store, repository) = setup();
        repository.insert(&depot()).await.unwrap();

        store.fail_command("SREM");
        store.fail_command("ZREM");
        assert!(repository.remove("loc1").await.unwrap());
        store.clear_failures();

        assert_eq!(repository.find_by_id("loc1").await.unwrap(), None);
        // Orphaned index entries are skipped on read
        assert!(repository.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_propagates_primary_failure() {
        let (store, repository) = setup();
        repository.insert(&depot()).await.unwrap();

        store.fail_command("DEL");
        assert!(matches!(
            repository.remove("loc1").await,
            Err(LocationStoreError::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_find_all_complete() {
        let (_store, repository) = setup();
        let inputs: Vec<Location> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, id)| location(id, 40.0 + i as f64, -120.0))
            .collect();
        for loc in &inputs {
            repository.insert(loc).await.unwrap();
        }

        let mut all = repository.find_all().await.unwrap();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(all, inputs);
    }

    #[tokio::test]
    async fn test_find_page() {
        let (_store, repository) = setup();
        for id in ["d", "a", "c", "b", "e"] {
            repository.insert(&location(id, 1.0, 1.0)).await.unwrap();
        }

        let (first, total) = repository.find_page(0, 2).await.unwrap();
        assert_eq!(total, 5);
        let ids: Vec<&str> = first.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let (last, _) = repository.find_page(4, 2).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, "e");

        let (beyond, total) = repository.find_page(10, 2).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_update_removes_stale_fields() {
        let (store, repository) = setup();
        let mut loc = depot();
        loc.images.push(Image {
            filename: "f2".to_string(),
            original_filename: "o2".to_string(),
            description: Some("second".to_string()),
        });
        loc.tags.push("restrooms".to_string());
        repository.insert(&loc).await.unwrap();

        let mut updated = depot();
        updated.tags.clear();
        updated.coordinates = Coordinates::new(45.5, -122.6);
        repository.update(&updated).await.unwrap();

        let raw = raw_hash(&store, "test:locations:info:loc1").await;
        assert!(!raw.contains_key("image-filename-1"));
        assert!(!raw.contains_key("tag-0"));
        assert!(!raw.contains_key("tag-1"));

        assert_eq!(
            repository.find_by_id("loc1").await.unwrap(),
            Some(updated.clone())
        );

        // The geo index follows the new coordinates
        let old_spot = repository
            .find_nearby(&NearbyParams::radius(
                Coordinates::new(47.6, -122.3),
                1.0,
                DistanceUnit::Km,
            ))
            .await
            .unwrap();
        assert!(old_spot.is_empty());

        let new_spot = repository
            .find_nearby(&NearbyParams::radius(
                updated.coordinates,
                1.0,
                DistanceUnit::Km,
            ))
            .await
            .unwrap();
        assert_eq!(new_spot, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (store, repository) = setup();
        assert!(matches!(
            repository.update(&depot()).await,
            Err(LocationStoreError::NotFound(_))
        ));
        assert!(raw_hash(&store, "test:locations:info:loc1").await.is_empty());
    }

    #[tokio::test]
    async fn test_insert_rolls_back_when_geo_index_fails() {
        let (store, repository) = setup();
        store.fail_command("GEOADD");

        let result = repository.insert(&depot()).await;
        assert!(matches!(
            result,
            Err(LocationStoreError::InconsistentState {
                operation: "insert",
                rolled_back: true,
                ..
            })
        ));

        store.clear_failures();
        assert!(raw_hash(&store, "test:locations:info:loc1").await.is_empty());
        assert!(id_set(&store).await.is_empty());

        // Nothing left behind blocks a retry
        repository.insert(&depot()).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_reports_failed_rollback() {
        let (store, repository) = setup();
        store.fail_command("SADD");
        store.fail_command("DEL");

        let result = repository.insert(&depot()).await;
        assert!(matches!(
            result,
            Err(LocationStoreError::InconsistentState {
                rolled_back: false,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_update_restores_previous_record_on_failure() {
        let (store, repository) = setup();
        let original = depot();
        repository.insert(&original).await.unwrap();

        let mut updated = depot();
        updated.name = "Renamed".to_string();
        updated.tags.clear();

        store.fail_command("GEOADD");
        let result = repository.update(&updated).await;
        store.clear_failures();

        assert!(matches!(
            result,
            Err(LocationStoreError::InconsistentState {
                operation: "update",
                rolled_back: true,
                ..
            })
        ));
        assert_eq!(
            repository.find_by_id("loc1").await.unwrap(),
            Some(original)
        );
    }

    #[tokio::test]
    async fn test_find_nearby_validates_before_backend() {
        let (store, repository) = setup();
        store.fail_command("CONNECT");

        let mut params = NearbyParams::radius(Coordinates::new(0.0, 0.0), 1.0, DistanceUnit::Km);
        params.width = Some(1.0);
        params.height = Some(1.0);
        assert!(matches!(
            repository.find_nearby(&params).await,
            Err(LocationStoreError::Validation(_))
        ));

        params.radius = None;
        params.width = None;
        params.height = None;
        assert!(matches!(
            repository.find_nearby(&params).await,
            Err(LocationStoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_find_nearby_preserves_index_order() {
        let (_store, repository) = setup();
        for (id, lat) in [("b", 47.61), ("a", 47.602), ("c", 47.605)] {
            repository.insert(&location(id, lat, -122.3)).await.unwrap();
        }

        let params = NearbyParams::radius(Coordinates::new(47.6, -122.3), 5.0, DistanceUnit::Km);
        let asc: Vec<String> = repository
            .find_nearby(&params)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(asc, vec!["a", "c", "b"]);

        let desc: Vec<String> = repository
            .find_nearby(&params.with_sort(SortOrder::Desc))
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(desc, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_backend_unavailable_surfaces() {
        let (store, repository) = setup();
        store.fail_command("CONNECT");
        assert!(matches!(
            repository.find_by_id("loc1").await,
            Err(LocationStoreError::BackendUnavailable(KvError::Connection(_)))
        ));
    }
}
