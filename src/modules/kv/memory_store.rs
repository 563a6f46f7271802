use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{GeoShape, HashRecord, KeyValueStore, KvError, StoreConnection};
use crate::shared::geo::{haversine_distance, Coordinates, SortOrder};

/// In-process store following the Redis backend's command semantics,
/// including its rejection of points outside the geo index range.
///
/// Each command takes the lock once, so commands are atomic individually but
/// multi-command sequences can interleave, matching a real server.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    failing_commands: RwLock<HashSet<&'static str>>,
}

#[derive(Default)]
struct MemoryState {
    hashes: HashMap<String, HashRecord>,
    sets: HashMap<String, BTreeSet<String>>,
    geo: HashMap<String, HashMap<String, Coordinates>>,
}

impl MemoryState {
    fn remove_key(&mut self, key: &str) -> bool {
        let hash = self.hashes.remove(key).is_some();
        let set = self.sets.remove(key).is_some();
        let geo = self.geo.remove(key).is_some();
        hash || set || geo
    }
}

fn check_geo_point(command: &'static str, point: Coordinates) -> Result<(), KvError> {
    point.validate_indexable().map_err(|_| KvError::Command {
        command,
        message: format!(
            "invalid longitude,latitude pair {:.6},{:.6}",
            point.longitude, point.latitude
        ),
    })
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `command` fail until cleared
    #[cfg(test)]
    pub fn fail_command(&self, command: &'static str) {
        if let Ok(mut failing) = self.failing_commands.write() {
            failing.insert(command);
        }
    }

    #[cfg(test)]
    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing_commands.write() {
            failing.clear();
        }
    }

    fn check(&self, command: &'static str) -> Result<(), KvError> {
        let failing = self
            .failing_commands
            .read()
            .map_err(|_| KvError::Connection("lock poisoned".to_string()))?;

        if failing.contains(command) {
            return Err(KvError::Connection(format!(
                "connection reset during {}",
                command
            )));
        }
        Ok(())
    }

    fn read(&self, command: &'static str) -> Result<RwLockReadGuard<'_, MemoryState>, KvError> {
        self.check(command)?;
        self.state
            .read()
            .map_err(|_| KvError::Connection("lock poisoned".to_string()))
    }

    fn write(&self, command: &'static str) -> Result<RwLockWriteGuard<'_, MemoryState>, KvError> {
        self.check(command)?;
        self.state
            .write()
            .map_err(|_| KvError::Connection("lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection + '_>, KvError> {
        self.check("CONNECT")?;
        Ok(Box::new(MemoryConnection { store: self }))
    }
}

struct MemoryConnection<'a> {
    store: &'a MemoryStore,
}

/// Distance from `center` to `point` in meters, if the point lies inside the box.
///
/// The box is measured along the point's own parallel and meridian, the way the
/// Redis geo index tests rectangle membership.
fn distance_if_in_box(
    center: Coordinates,
    point: Coordinates,
    width_m: f64,
    height_m: f64,
) -> Option<f64> {
    let lat_distance = haversine_distance(
        point.latitude,
        point.longitude,
        center.latitude,
        point.longitude,
    );
    if lat_distance > height_m / 2.0 {
        return None;
    }

    let lon_distance = haversine_distance(
        point.latitude,
        point.longitude,
        point.latitude,
        center.longitude,
    );
    if lon_distance > width_m / 2.0 {
        return None;
    }

    Some(haversine_distance(
        center.latitude,
        center.longitude,
        point.latitude,
        point.longitude,
    ))
}

#[async_trait]
impl StoreConnection for MemoryConnection<'_> {
    async fn key_exists(&mut self, key: &str) -> Result<bool, KvError> {
        let state = self.store.read("EXISTS")?;
        Ok(state.hashes.contains_key(key)
            || state.sets.contains_key(key)
            || state.geo.contains_key(key))
    }

    async fn delete_key(&mut self, key: &str) -> Result<bool, KvError> {
        let mut state = self.store.write("DEL")?;
        Ok(state.remove_key(key))
    }

    async fn hash_get_all(&mut self, key: &str) -> Result<HashRecord, KvError> {
        let state = self.store.read("HGETALL")?;
        Ok(state.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hash_get_all_batch(&mut self, keys: &[String]) -> Result<Vec<HashRecord>, KvError> {
        let state = self.store.read("HGETALL")?;
        Ok(keys
            .iter()
            .map(|key| state.hashes.get(key).cloned().unwrap_or_default())
            .collect())
    }

    async fn hash_set(&mut self, key: &str, fields: &HashRecord) -> Result<(), KvError> {
        let mut state = self.store.write("HSET")?;
        if fields.is_empty() {
            return Ok(());
        }
        state
            .hashes
            .entry(key.to_string())
            .or_default()
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn hash_delete_fields(&mut self, key: &str, fields: &[String]) -> Result<u64, KvError> {
        let mut state = self.store.write("HDEL")?;
        let Some(hash) = state.hashes.get_mut(key) else {
            return Ok(0);
        };

        let removed = fields
            .iter()
            .filter(|field| hash.remove(field.as_str()).is_some())
            .count() as u64;

        // Redis drops a hash once its last field is gone
        if hash.is_empty() {
            state.hashes.remove(key);
        }
        Ok(removed)
    }

    async fn set_add(&mut self, key: &str, member: &str) -> Result<bool, KvError> {
        let mut state = self.store.write("SADD")?;
        Ok(state
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set_remove(&mut self, key: &str, member: &str) -> Result<bool, KvError> {
        let mut state = self.store.write("SREM")?;
        let Some(set) = state.sets.get_mut(key) else {
            return Ok(false);
        };
        let removed = set.remove(member);
        if set.is_empty() {
            state.sets.remove(key);
        }
        Ok(removed)
    }

    async fn set_members(&mut self, key: &str) -> Result<Vec<String>, KvError> {
        let state = self.store.read("SMEMBERS")?;
        Ok(state
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn geo_add(
        &mut self,
        key: &str,
        member: &str,
        point: Coordinates,
    ) -> Result<(), KvError> {
        check_geo_point("GEOADD", point)?;
        let mut state = self.store.write("GEOADD")?;
        state
            .geo
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), point);
        Ok(())
    }

    async fn geo_remove(&mut self, key: &str, member: &str) -> Result<bool, KvError> {
        let mut state = self.store.write("ZREM")?;
        let Some(index) = state.geo.get_mut(key) else {
            return Ok(false);
        };
        let removed = index.remove(member).is_some();
        if index.is_empty() {
            state.geo.remove(key);
        }
        Ok(removed)
    }

    async fn geo_search(
        &mut self,
        key: &str,
        center: Coordinates,
        shape: GeoShape,
        sort: SortOrder,
    ) -> Result<Vec<String>, KvError> {
        check_geo_point("GEOSEARCH", center)?;
        let state = self.store.read("GEOSEARCH")?;
        let Some(index) = state.geo.get(key) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(&String, f64)> = index
            .iter()
            .filter_map(|(member, point)| {
                let distance = match shape {
                    GeoShape::Radius { radius, unit } => {
                        let distance = haversine_distance(
                            center.latitude,
                            center.longitude,
                            point.latitude,
                            point.longitude,
                        );
                        (distance <= unit.to_meters(radius)).then_some(distance)
                    }
                    GeoShape::Box {
                        width,
                        height,
                        unit,
                    } => distance_if_in_box(
                        center,
                        *point,
                        unit.to_meters(width),
                        unit.to_meters(height),
                    ),
                };
                distance.map(|d| (member, d))
            })
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        if sort == SortOrder::Desc {
            hits.reverse();
        }

        Ok(hits.into_iter().map(|(member, _)| member.clone()).collect())
    }
}
