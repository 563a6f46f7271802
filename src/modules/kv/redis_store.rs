use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::{
    bb8::{self, PooledConnection, RunError},
    redis::{self, aio::MultiplexedConnection, AsyncCommands, RedisError},
    RedisConnectionManager,
};

use super::{GeoShape, HashRecord, KeyValueStore, KvError, StoreConnection};
use crate::core::config::StoreConfig;
use crate::shared::geo::{Coordinates, SortOrder};

/// Redis-backed store using a bb8 connection pool
pub struct RedisStore {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, KvError> {
        let manager = RedisConnectionManager::new(config.connection_url())
            .map_err(|e| KvError::Connection(format!("Invalid Redis URL: {}", e)))?;

        let pool = bb8::Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .build(manager)
            .await
            .map_err(|e| KvError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection + '_>, KvError> {
        let conn = self.pool.get().await.map_err(|e| match e {
            RunError::User(e) => KvError::Connection(e.to_string()),
            RunError::TimedOut => {
                KvError::Connection("Timed out waiting for a Redis connection".to_string())
            }
        })?;

        Ok(Box::new(RedisConnection { conn }))
    }
}

struct RedisConnection<'a> {
    conn: PooledConnection<'a, RedisConnectionManager>,
}

impl RedisConnection<'_> {
    fn inner(&mut self) -> &mut MultiplexedConnection {
        &mut self.conn
    }
}

fn command_error(command: &'static str) -> impl FnOnce(RedisError) -> KvError {
    move |e| {
        if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
            tracing::error!("Redis {} failed on connection: {:?}", command, e);
            KvError::Connection(e.to_string())
        } else {
            tracing::error!("Redis {} failed: {:?}", command, e);
            KvError::Command {
                command,
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl StoreConnection for RedisConnection<'_> {
    async fn key_exists(&mut self, key: &str) -> Result<bool, KvError> {
        self.inner()
            .exists(key)
            .await
            .map_err(command_error("EXISTS"))
    }

    async fn delete_key(&mut self, key: &str) -> Result<bool, KvError> {
        let removed: u64 = self
            .inner()
            .del(key)
            .await
            .map_err(command_error("DEL"))?;
        Ok(removed > 0)
    }

    async fn hash_get_all(&mut self, key: &str) -> Result<HashRecord, KvError> {
        self.inner()
            .hgetall(key)
            .await
            .map_err(command_error("HGETALL"))
    }

    async fn hash_get_all_batch(&mut self, keys: &[String]) -> Result<Vec<HashRecord>, KvError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipeline = redis::pipe();
        for key in keys {
            pipeline.hgetall(key);
        }

        pipeline
            .query_async(self.inner())
            .await
            .map_err(command_error("HGETALL"))
    }

    async fn hash_set(&mut self, key: &str, fields: &HashRecord) -> Result<(), KvError> {
        if fields.is_empty() {
            return Ok(());
        }

        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
            .collect();

        let _: () = self
            .inner()
            .hset_multiple(key, &items)
            .await
            .map_err(command_error("HSET"))?;
        Ok(())
    }

    async fn hash_delete_fields(&mut self, key: &str, fields: &[String]) -> Result<u64, KvError> {
        if fields.is_empty() {
            return Ok(0);
        }

        self.inner()
            .hdel(key, fields)
            .await
            .map_err(command_error("HDEL"))
    }

    async fn set_add(&mut self, key: &str, member: &str) -> Result<bool, KvError> {
        let added: u64 = self
            .inner()
            .sadd(key, member)
            .await
            .map_err(command_error("SADD"))?;
        Ok(added > 0)
    }

    async fn set_remove(&mut self, key: &str, member: &str) -> Result<bool, KvError> {
        let removed: u64 = self
            .inner()
            .srem(key, member)
            .await
            .map_err(command_error("SREM"))?;
        Ok(removed > 0)
    }

    async fn set_members(&mut self, key: &str) -> Result<Vec<String>, KvError> {
        self.inner()
            .smembers(key)
            .await
            .map_err(command_error("SMEMBERS"))
    }

    async fn geo_add(
        &mut self,
        key: &str,
        member: &str,
        point: Coordinates,
    ) -> Result<(), KvError> {
        let _: () = redis::cmd("GEOADD")
            .arg(key)
            .arg(point.longitude)
            .arg(point.latitude)
            .arg(member)
            .query_async(self.inner())
            .await
            .map_err(command_error("GEOADD"))?;
        Ok(())
    }

    async fn geo_remove(&mut self, key: &str, member: &str) -> Result<bool, KvError> {
        // Geo indexes are sorted sets, so ZREM removes members
        let removed: u64 = self
            .inner()
            .zrem(key, member)
            .await
            .map_err(command_error("ZREM"))?;
        Ok(removed > 0)
    }

    async fn geo_search(
        &mut self,
        key: &str,
        center: Coordinates,
        shape: GeoShape,
        sort: SortOrder,
    ) -> Result<Vec<String>, KvError> {
        let mut cmd = redis::cmd("GEOSEARCH");
        cmd.arg(key)
            .arg("FROMLONLAT")
            .arg(center.longitude)
            .arg(center.latitude);

        match shape {
            GeoShape::Radius { radius, unit } => {
                cmd.arg("BYRADIUS").arg(radius).arg(unit.as_str());
            }
            GeoShape::Box {
                width,
                height,
                unit,
            } => {
                cmd.arg("BYBOX").arg(width).arg(height).arg(unit.as_str());
            }
        }
        cmd.arg(sort.as_str());

        cmd.query_async(self.inner())
            .await
            .map_err(command_error("GEOSEARCH"))
    }
}
