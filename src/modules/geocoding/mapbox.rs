use async_trait::async_trait;
use serde::Deserialize;

use super::Geocoder;
use crate::core::error::{AppError, Result};
use crate::shared::geo::{Address, Coordinates};

/// Mapbox Geocoding API v6 response
#[derive(Debug, Deserialize)]
pub struct MapboxResponse {
    #[serde(default)]
    pub features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
pub struct MapboxFeature {
    pub properties: MapboxProperties,
}

#[derive(Debug, Deserialize)]
pub struct MapboxProperties {
    pub coordinates: Option<Coordinates>,
    pub context: Option<MapboxContext>,
}

#[derive(Debug, Deserialize)]
pub struct MapboxContext {
    pub address: Option<MapboxNamed>,
    pub place: Option<MapboxNamed>,
    pub region: Option<MapboxRegion>,
    pub postcode: Option<MapboxNamed>,
}

#[derive(Debug, Deserialize)]
pub struct MapboxNamed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MapboxRegion {
    pub name: Option<String>,
    pub region_code: Option<String>,
}

impl MapboxContext {
    fn into_address(self) -> Address {
        Address {
            street_address: self.address.map(|a| a.name).unwrap_or_default(),
            city: self.place.map(|p| p.name).unwrap_or_default(),
            state: self
                .region
                .and_then(|r| r.region_code.or(r.name))
                .unwrap_or_default(),
            zip: self.postcode.map(|p| p.name).unwrap_or_default(),
        }
    }
}

impl MapboxResponse {
    fn first_coordinates(self) -> Option<Coordinates> {
        self.features
            .into_iter()
            .next()
            .and_then(|f| f.properties.coordinates)
    }

    fn first_address(self) -> Option<Address> {
        self.features
            .into_iter()
            .next()
            .and_then(|f| f.properties.context)
            .map(MapboxContext::into_address)
    }
}

/// Geocoder backed by the Mapbox v6 API
pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MapboxGeocoder {
    pub fn new(base_url: String, access_token: String) -> std::result::Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("LocationFinder/1.0")
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    async fn execute_request(&self, url: &str) -> Result<Option<MapboxResponse>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Mapbox request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Mapbox request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Mapbox returned status: {}", response.status());
            return Ok(None);
        }

        let body: MapboxResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Mapbox response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Mapbox response: {}", e))
        })?;

        Ok(Some(body))
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn geocode(&self, location_text: &str) -> Result<Option<Coordinates>> {
        let url = format!(
            "{}/forward?q={}&types=address&access_token={}",
            self.base_url,
            urlencoding::encode(location_text),
            self.access_token
        );
        tracing::debug!("Geocoding (mapbox): {}", location_text);

        Ok(self
            .execute_request(&url)
            .await?
            .and_then(MapboxResponse::first_coordinates))
    }

    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Option<Address>> {
        let url = format!(
            "{}/reverse?latitude={}&longitude={}&types=address&access_token={}",
            self.base_url, coordinates.latitude, coordinates.longitude, self.access_token
        );
        tracing::debug!(
            "Reverse geocoding (mapbox): {}, {}",
            coordinates.latitude,
            coordinates.longitude
        );

        Ok(self
            .execute_request(&url)
            .await?
            .and_then(MapboxResponse::first_address))
    }
}
