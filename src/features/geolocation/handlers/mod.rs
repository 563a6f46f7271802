mod geolocation_handler;

pub use geolocation_handler::*;
