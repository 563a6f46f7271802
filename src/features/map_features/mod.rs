//! Public map layer: visible locations rendered as GeoJSON

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::FeatureService;
