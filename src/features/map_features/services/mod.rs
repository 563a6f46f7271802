mod feature_service;

pub use feature_service::FeatureService;
