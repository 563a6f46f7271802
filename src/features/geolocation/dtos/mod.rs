mod geolocation_dto;

pub use geolocation_dto::*;
