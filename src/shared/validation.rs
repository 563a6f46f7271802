use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::core::error::{AppError, Result};

lazy_static! {
    /// Regex for validating location ids
    /// Ids end up inside store keys, so separators and whitespace are not allowed
    /// - Valid: "loc1", "V1StGXR8_Z5jdHi6B-myT", "0190b1a4-7c3e-7d2a-9f10-3b1c2d4e5f60"
    /// - Invalid: "a:b", "two words", "", "loc/1"
    pub static ref LOCATION_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Check an id taken from a request path
pub fn validate_location_id(id: &str) -> Result<()> {
    if LOCATION_ID_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid location id '{}': only letters, digits, hyphens and underscores are allowed",
            id
        )))
    }
}

/// Tags are an ordered set; the same tag may not appear twice
pub fn validate_unique_tags(tags: &[String]) -> std::result::Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(tags.len());
    match tags.iter().find(|tag| !seen.insert(tag.as_str())) {
        Some(duplicate) => {
            let mut error = ValidationError::new("duplicate_tag");
            error.message = Some(format!("Tag '{}' is listed more than once", duplicate).into());
            Err(error)
        }
        None => Ok(()),
    }
}
