use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::locations::dtos::LocationRequestDto;
use crate::features::locations::models::{Location, NearbyParams};
use crate::features::locations::store::LocationRepository;
use crate::modules::geocoding::Geocoder;
use crate::shared::geo::Coordinates;
use crate::shared::validation::validate_location_id;

/// Service for location catalog operations
pub struct LocationService {
    repository: Arc<LocationRepository>,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationService {
    pub fn new(repository: Arc<LocationRepository>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            repository,
            geocoder,
        }
    }

    /// One page of locations plus the total count
    pub async fn list(&self, offset: usize, limit: usize) -> Result<(Vec<Location>, usize)> {
        Ok(self.repository.find_page(offset, limit).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Location> {
        validate_location_id(id)?;
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location '{}' not found", id)))
    }

    pub async fn nearby(&self, params: NearbyParams) -> Result<Vec<Location>> {
        Ok(self.repository.find_nearby(&params).await?)
    }

    pub async fn create(&self, dto: LocationRequestDto) -> Result<Location> {
        let id = dto
            .id
            .clone()
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let location = self.build_location(id, dto).await?;

        self.repository.insert(&location).await?;
        tracing::info!("Location {} created", location.id);
        Ok(location)
    }

    /// Replace the location stored under `id`
    pub async fn update(&self, id: &str, dto: LocationRequestDto) -> Result<Location> {
        validate_location_id(id)?;
        if let Some(body_id) = dto.id.as_deref() {
            if body_id != id {
                return Err(AppError::BadRequest(format!(
                    "Body id '{}' does not match path id '{}'",
                    body_id, id
                )));
            }
        }

        let location = self.build_location(id.to_string(), dto).await?;

        self.repository.update(&location).await?;
        tracing::info!("Location {} updated", location.id);
        Ok(location)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        validate_location_id(id)?;
        if !self.repository.remove(id).await? {
            return Err(AppError::NotFound(format!("Location '{}' not found", id)));
        }
        tracing::info!("Location {} deleted", id);
        Ok(())
    }

    async fn build_location(&self, id: String, dto: LocationRequestDto) -> Result<Location> {
        let coordinates = match dto.coordinates {
            Some(coordinates) => coordinates,
            None => self.resolve_coordinates(&dto).await?,
        };

        Ok(Location {
            id,
            name: dto.name,
            street_address: dto.street_address,
            city: dto.city,
            state: dto.state,
            zip: dto.zip,
            coordinates,
            description: dto.description,
            images: dto.images,
            tags: dto.tags,
            display_on_site: dto.display_on_site,
        })
    }

    async fn resolve_coordinates(&self, dto: &LocationRequestDto) -> Result<Coordinates> {
        let query = dto.address().to_query();
        tracing::debug!("Geocoding address for location: {}", query);

        self.geocoder.geocode(&query).await?.ok_or_else(|| {
            AppError::Validation(format!("Could not find coordinates for address '{}'", query))
        })
    }
}
