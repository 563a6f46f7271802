//! Location catalog
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/locations` | Paginated list |
//! | GET | `/api/locations/nearby` | Radius or box search |
//! | GET | `/api/locations/{id}` | Single location |
//! | POST | `/api/locations` | Create (geocodes the address when coordinates are missing) |
//! | PUT | `/api/locations/{id}` | Replace |
//! | DELETE | `/api/locations/{id}` | Delete |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::LocationService;
