mod feature_dto;

pub use feature_dto::*;
