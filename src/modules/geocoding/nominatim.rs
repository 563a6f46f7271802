use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::Geocoder;
use crate::core::error::{AppError, Result};
use crate::shared::geo::{Address, Coordinates};

/// Nominatim API response structure
#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub address: Option<NominatimAddress>,
}

/// Nominatim address components
#[derive(Debug, Deserialize)]
pub struct NominatimAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "ISO3166-2-lvl4")]
    pub state_code: Option<String>,
    pub postcode: Option<String>,
}

impl NominatimAddress {
    /// Get city, falling back to town or village
    pub fn get_city(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
    }

    /// Region abbreviation ("US-WA" -> "WA"), falling back to the state name
    pub fn get_state(&self) -> Option<String> {
        self.state_code
            .as_deref()
            .and_then(|code| code.rsplit_once('-').map(|(_, abbr)| abbr.to_string()))
            .or_else(|| self.state.clone())
    }

    fn street_address(&self) -> String {
        match (&self.house_number, &self.road) {
            (Some(number), Some(road)) => format!("{} {}", number, road),
            (None, Some(road)) => road.clone(),
            _ => String::new(),
        }
    }
}

impl NominatimResponse {
    fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.lat.as_deref()?.parse().ok()?;
        let lon = self.lon.as_deref()?.parse().ok()?;
        Some(Coordinates::new(lat, lon))
    }

    fn to_address(&self) -> Option<Address> {
        self.address.as_ref().map(|a| Address {
            street_address: a.street_address(),
            city: a.get_city().unwrap_or_default(),
            state: a.get_state().unwrap_or_default(),
            zip: a.postcode.clone().unwrap_or_default(),
        })
    }
}

/// Geocoder backed by OpenStreetMap Nominatim
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: String) -> std::result::Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("LocationFinder/1.0 (location-finder-api)")
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Execute HTTP request to Nominatim and parse response
    async fn execute_request<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Ok(None);
        }

        let body: T = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(Some(body))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, location_text: &str) -> Result<Option<Coordinates>> {
        let url = format!(
            "{}/search?q={}&format=json&addressdetails=1&limit=1",
            self.base_url,
            urlencoding::encode(location_text)
        );
        tracing::debug!("Geocoding (nominatim): {} -> {}", location_text, url);

        let results: Option<Vec<NominatimResponse>> = self.execute_request(&url).await?;
        Ok(results
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.coordinates()))
    }

    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Option<Address>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url, coordinates.latitude, coordinates.longitude
        );
        tracing::debug!("Reverse geocoding (nominatim): {}", url);

        let result: Option<NominatimResponse> = self.execute_request(&url).await?;
        Ok(result.and_then(|r| r.to_address()))
    }
}
