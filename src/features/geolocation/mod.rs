//! Address and coordinate lookups backed by the configured geocoder

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::GeolocationService;
