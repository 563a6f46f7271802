//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the key-value store backends and geocoding provider clients.

pub mod geocoding;
pub mod kv;
