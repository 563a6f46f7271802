//! Persistence for locations on top of a [`KeyValueStore`](crate::modules::kv::KeyValueStore).
//!
//! Each location lives in three places: a hash holding its fields, a set of
//! all location hash keys, and a geo index keyed by location id.

pub mod codec;
mod error;
mod geo_index;
mod keys;
mod repository;

pub use error::LocationStoreError;
pub use keys::KeyNamespace;
pub use repository::LocationRepository;
