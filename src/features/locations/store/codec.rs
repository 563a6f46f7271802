//! Conversion between [`Location`] and the flat hash stored in the backend.
//!
//! Scalars map one field per property. Images and tags are spread over
//! positional fields: `image-<property>-<i>` and `tag-<i>`. This layout is the
//! persisted format and must stay readable by existing data.

use std::collections::BTreeMap;

use crate::features::locations::models::{Image, Location};
use crate::features::locations::store::error::{LocationStoreError, StoreResult};
use crate::modules::kv::HashRecord;
use crate::shared::geo::Coordinates;

const ID: &str = "id";
const NAME: &str = "name";
const STREET_ADDRESS: &str = "streetAddress";
const CITY: &str = "city";
const STATE: &str = "state";
const ZIP: &str = "zip";
const LATITUDE: &str = "latitude";
const LONGITUDE: &str = "longitude";
const DESCRIPTION: &str = "description";
const DISPLAY_ON_SITE: &str = "displayOnSite";

const IMAGE_PREFIX: &str = "image-";
const TAG_PREFIX: &str = "tag-";

const IMAGE_ORIGINAL_FILENAME: &str = "originalFilename";
const IMAGE_FILENAME: &str = "filename";
const IMAGE_DESCRIPTION: &str = "description";

/// Flatten a location into hash fields
pub fn flatten(location: &Location) -> HashRecord {
    let mut record = HashRecord::new();

    record.insert(ID.to_string(), location.id.clone());
    record.insert(NAME.to_string(), location.name.clone());
    record.insert(STREET_ADDRESS.to_string(), location.street_address.clone());
    record.insert(CITY.to_string(), location.city.clone());
    record.insert(STATE.to_string(), location.state.clone());
    record.insert(ZIP.to_string(), location.zip.clone());
    record.insert(
        LATITUDE.to_string(),
        location.coordinates.latitude.to_string(),
    );
    record.insert(
        LONGITUDE.to_string(),
        location.coordinates.longitude.to_string(),
    );
    record.insert(DESCRIPTION.to_string(), location.description.clone());
    record.insert(
        DISPLAY_ON_SITE.to_string(),
        location.display_on_site.to_string(),
    );

    for (index, image) in location.images.iter().enumerate() {
        record.insert(
            image_field(IMAGE_ORIGINAL_FILENAME, index),
            image.original_filename.clone(),
        );
        record.insert(image_field(IMAGE_FILENAME, index), image.filename.clone());
        record.insert(
            image_field(IMAGE_DESCRIPTION, index),
            image.description.clone().unwrap_or_default(),
        );
    }

    for (index, tag) in location.tags.iter().enumerate() {
        record.insert(format!("{}{}", TAG_PREFIX, index), tag.clone());
    }

    record
}

fn image_field(property: &str, index: usize) -> String {
    format!("{}{}-{}", IMAGE_PREFIX, property, index)
}

#[derive(Default)]
struct ImageParts {
    filename: Option<String>,
    original_filename: Option<String>,
    description: Option<String>,
}

/// Only canonical decimal indexes are accepted, so `tag-01` cannot shadow `tag-1`
fn parse_index(key: &str, raw: &str) -> StoreResult<usize> {
    let leading_zero = raw.len() > 1 && raw.starts_with('0');
    if raw.is_empty() || leading_zero || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LocationStoreError::Validation(format!(
            "malformed index in stored field '{}'",
            key
        )));
    }
    raw.parse().map_err(|_| {
        LocationStoreError::Validation(format!("index out of range in stored field '{}'", key))
    })
}

fn parse_coordinate(record: &HashRecord, field: &str) -> StoreResult<f64> {
    record
        .get(field)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .ok_or_else(|| {
            LocationStoreError::Validation(format!("stored field '{}' is missing or not a number", field))
        })
}

/// Rebuild a location from hash fields.
///
/// An empty record means the key does not exist and yields `None`. Fields the
/// codec does not know are ignored.
pub fn remap(record: &HashRecord) -> StoreResult<Option<Location>> {
    if record.is_empty() {
        return Ok(None);
    }

    let mut images: BTreeMap<usize, ImageParts> = BTreeMap::new();
    let mut tags: BTreeMap<usize, String> = BTreeMap::new();

    for (key, value) in record {
        if let Some(rest) = key.strip_prefix(IMAGE_PREFIX) {
            let Some((property, raw_index)) = rest.rsplit_once('-') else {
                return Err(LocationStoreError::Validation(format!(
                    "stored image field '{}' has no index",
                    key
                )));
            };
            let index = parse_index(key, raw_index)?;
            if !matches!(
                property,
                IMAGE_FILENAME | IMAGE_ORIGINAL_FILENAME | IMAGE_DESCRIPTION
            ) {
                continue;
            }
            let parts = images.entry(index).or_default();
            match property {
                IMAGE_FILENAME => parts.filename = Some(value.clone()),
                IMAGE_ORIGINAL_FILENAME => parts.original_filename = Some(value.clone()),
                _ => parts.description = Some(value.clone()),
            }
        } else if let Some(raw_index) = key.strip_prefix(TAG_PREFIX) {
            let index = parse_index(key, raw_index)?;
            tags.insert(index, value.clone());
        }
    }

    let field = |name: &str| record.get(name).cloned().unwrap_or_default();

    let coordinates = Coordinates::new(
        parse_coordinate(record, LATITUDE)?,
        parse_coordinate(record, LONGITUDE)?,
    );

    Ok(Some(Location {
        id: field(ID),
        name: field(NAME),
        street_address: field(STREET_ADDRESS),
        city: field(CITY),
        state: field(STATE),
        zip: field(ZIP),
        coordinates,
        description: field(DESCRIPTION),
        images: images
            .into_values()
            .map(|parts| Image {
                filename: parts.filename.unwrap_or_default(),
                original_filename: parts.original_filename.unwrap_or_default(),
                description: parts.description.filter(|d| !d.is_empty()),
            })
            .collect(),
        tags: tags.into_values().collect(),
        display_on_site: record
            .get(DISPLAY_ON_SITE)
            .is_some_and(|v| v == "true"),
    }))
}

/// Fields present in `existing` that `replacement` no longer writes
pub fn stale_fields(existing: &HashRecord, replacement: &HashRecord) -> Vec<String> {
    let mut stale: Vec<String> = existing
        .keys()
        .filter(|key| !replacement.contains_key(*key))
        .cloned()
        .collect();
    stale.sort();
    stale
}
