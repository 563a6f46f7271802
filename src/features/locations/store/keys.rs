/// Builds every key the service stores, under a configured prefix.
///
/// | Key | Type |
/// |-----|------|
/// | `<prefix>:locations:info:<id>` | hash |
/// | `<prefix>:locations:geo` | geo |
/// | `<prefix>:locations:ids` | set of location hash keys |
/// | `<prefix>:tags` | set |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamespace {
    prefix: String,
}

impl KeyNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}:{}", self.prefix, suffix)
    }

    pub fn location_hash_key(&self, id: &str) -> String {
        self.key(&format!("locations:info:{}", id))
    }

    pub fn location_geo_key(&self) -> String {
        self.key("locations:geo")
    }

    pub fn location_ids_key(&self) -> String {
        self.key("locations:ids")
    }

    pub fn tags_key(&self) -> String {
        self.key("tags")
    }

    /// Inverse of [`Self::location_hash_key`]
    pub fn location_id_from_hash_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())?
            .strip_prefix(":locations:info:")
    }
}
