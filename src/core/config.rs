use std::env;

use crate::shared::constants::DEFAULT_KEY_PREFIX;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreConfig,
    pub geocoder: GeocoderConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Which key-value backend the location store runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!(
                "DATA_STORE must be \"redis\" or \"memory\", got \"{}\"",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub password: Option<String>,
    /// Prefix prepended to every key the service writes
    pub key_prefix: String,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

/// Which geocoding provider resolves addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocoderProvider {
    Mapbox,
    Nominatim,
}

impl std::str::FromStr for GeocoderProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapbox" => Ok(GeocoderProvider::Mapbox),
            "nominatim" => Ok(GeocoderProvider::Nominatim),
            other => Err(format!(
                "GEOCODER must be \"mapbox\" or \"nominatim\", got \"{}\"",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub provider: GeocoderProvider,
    pub mapbox_access_token: Option<String>,
    pub mapbox_geocode_url: String,
    pub nominatim_url: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            store: StoreConfig::from_env()?,
            geocoder: GeocoderConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("LF_API_HOST")
            .or_else(|_| env::var("HOST"))
            .unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("LF_API_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 5;

    pub fn from_env() -> Result<Self, String> {
        let backend = env::var("DATA_STORE")
            .unwrap_or_else(|_| "redis".to_string())
            .parse::<StoreBackend>()?;

        let url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let password = env::var("REDIS_PASSWORD").ok().filter(|s| !s.is_empty());

        let key_prefix =
            env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string());
        if key_prefix.is_empty() || key_prefix.contains(char::is_whitespace) {
            return Err("REDIS_KEY_PREFIX must be non-empty and contain no whitespace".to_string());
        }

        let max_connections = env::var("REDIS_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "REDIS_MAX_CONNECTIONS must be a valid number".to_string())?;

        let connection_timeout_secs = env::var("REDIS_CONNECTION_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_CONNECTION_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "REDIS_CONNECTION_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            backend,
            url,
            password,
            key_prefix,
            max_connections,
            connection_timeout_secs,
        })
    }

    /// Redis URL with the configured password spliced in, unless the URL already has credentials
    pub fn connection_url(&self) -> String {
        match &self.password {
            Some(password) if !self.url.contains('@') => {
                match self.url.split_once("://") {
                    Some((scheme, rest)) => format!(
                        "{}://:{}@{}",
                        scheme,
                        urlencoding::encode(password),
                        rest
                    ),
                    None => self.url.clone(),
                }
            }
            _ => self.url.clone(),
        }
    }
}

impl GeocoderConfig {
    pub fn from_env() -> Result<Self, String> {
        let provider = env::var("GEOCODER")
            .unwrap_or_else(|_| "mapbox".to_string())
            .parse::<GeocoderProvider>()?;

        let mapbox_access_token = env::var("MAPBOX_ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        let mapbox_geocode_url = env::var("MAPBOX_GEOCODE_URL")
            .unwrap_or_else(|_| "https://api.mapbox.com/search/geocode/v6".to_string());

        let nominatim_url = env::var("NOMINATIM_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

        Ok(Self {
            provider,
            mapbox_access_token,
            mapbox_geocode_url,
            nominatim_url,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Location Finder API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Geotagged point-of-interest catalog".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
