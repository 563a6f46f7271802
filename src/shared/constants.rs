/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Prefix for every key the service writes when `REDIS_KEY_PREFIX` is unset
pub const DEFAULT_KEY_PREFIX: &str = "lf";
