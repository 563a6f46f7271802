use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::shared::geo::{Address, Coordinates};

/// Query params for forward geocoding
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AddressQuery {
    #[validate(length(min = 1, message = "Street address is required"))]
    pub street_address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Zip is required"))]
    pub zip: String,
}

impl From<AddressQuery> for Address {
    fn from(q: AddressQuery) -> Self {
        Self {
            street_address: q.street_address,
            city: q.city,
            state: q.state,
            zip: q.zip,
        }
    }
}

/// Query params for reverse geocoding
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoordinatesQuery {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<CoordinatesQuery> for Coordinates {
    fn from(q: CoordinatesQuery) -> Self {
        Coordinates::new(q.latitude, q.longitude)
    }
}
