//! Key-value backend abstraction
//!
//! Exposes the primitives the location store is built on: hashes, sets and a
//! geospatial index. A store hands out a scoped connection per call; the
//! connection goes back to its pool when dropped, on every exit path.

mod memory_store;
mod redis_store;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::{StoreBackend, StoreConfig};
use crate::shared::geo::{Coordinates, DistanceUnit, SortOrder};

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

/// Flat string map stored in a backend hash
pub type HashRecord = HashMap<String, String>;

#[derive(Debug, Clone, Error)]
pub enum KvError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("command {command} failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },
}

/// Shape of a geospatial search around a center point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoShape {
    Radius {
        radius: f64,
        unit: DistanceUnit,
    },
    Box {
        width: f64,
        height: f64,
        unit: DistanceUnit,
    },
}

/// A key-value store that can lend out connections
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Acquire a connection for the duration of one repository call
    async fn acquire(&self) -> Result<Box<dyn StoreConnection + '_>, KvError>;
}

/// Commands available on an acquired connection.
///
/// Every method maps to a single backend command, except the batch reads which
/// are sent as one non-transactional pipeline.
#[async_trait]
pub trait StoreConnection: Send {
    async fn key_exists(&mut self, key: &str) -> Result<bool, KvError>;

    /// Delete a key of any type; returns whether it existed
    async fn delete_key(&mut self, key: &str) -> Result<bool, KvError>;

    /// All fields of a hash; empty when the key does not exist
    async fn hash_get_all(&mut self, key: &str) -> Result<HashRecord, KvError>;

    /// Pipelined `hash_get_all`; results are positional to `keys`
    async fn hash_get_all_batch(&mut self, keys: &[String]) -> Result<Vec<HashRecord>, KvError>;

    async fn hash_set(&mut self, key: &str, fields: &HashRecord) -> Result<(), KvError>;

    /// Remove fields from a hash; returns the number removed
    async fn hash_delete_fields(&mut self, key: &str, fields: &[String]) -> Result<u64, KvError>;

    async fn set_add(&mut self, key: &str, member: &str) -> Result<bool, KvError>;

    async fn set_remove(&mut self, key: &str, member: &str) -> Result<bool, KvError>;

    async fn set_members(&mut self, key: &str) -> Result<Vec<String>, KvError>;

    /// Insert or move a member of a geo index
    async fn geo_add(&mut self, key: &str, member: &str, point: Coordinates)
        -> Result<(), KvError>;

    async fn geo_remove(&mut self, key: &str, member: &str) -> Result<bool, KvError>;

    /// Members inside `shape` centered at `center`, ordered by distance
    async fn geo_search(
        &mut self,
        key: &str,
        center: Coordinates,
        shape: GeoShape,
        sort: SortOrder,
    ) -> Result<Vec<String>, KvError>;
}

/// Build the configured backend
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, KvError> {
    match config.backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(config).await?;
            tracing::info!(
                "Redis store connected (max_connections={})",
                config.max_connections
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
