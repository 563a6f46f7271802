mod location;

pub use location::{Image, Location, NearbyParams};
