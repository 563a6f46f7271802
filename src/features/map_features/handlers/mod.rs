mod feature_handler;

pub use feature_handler::*;
