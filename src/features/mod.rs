pub mod geolocation;
pub mod locations;
pub mod map_features;
pub mod tags;
