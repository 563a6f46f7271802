use std::sync::Arc;

use crate::core::error::Result;
use crate::features::locations::store::KeyNamespace;
use crate::modules::kv::KeyValueStore;

/// Read access to the tag vocabulary
pub struct TagService {
    store: Arc<dyn KeyValueStore>,
    keys: KeyNamespace,
}

impl TagService {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: KeyNamespace) -> Self {
        Self { store, keys }
    }

    /// All known tags, alphabetically
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut conn = self.store.acquire().await?;
        let mut tags = conn.set_members(&self.keys.tags_key()).await?;
        tags.sort();
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::modules::kv::MemoryStore;

    #[tokio::test]
    async fn test_list_sorted() {
        let store = Arc::new(MemoryStore::new());
        let keys = KeyNamespace::new("test");
        {
            let mut conn = store.acquire().await.unwrap();
            for tag in ["restrooms", "parking", "food"] {
                conn.set_add(&keys.tags_key(), tag).await.unwrap();
            }
        }

        let service = TagService::new(store, keys);
        assert_eq!(
            service.list().await.unwrap(),
            vec!["food", "parking", "restrooms"]
        );
    }

    #[tokio::test]
    async fn test_list_empty_and_unavailable() {
        let store = Arc::new(MemoryStore::new());
        let service = TagService::new(store.clone(), KeyNamespace::new("test"));
        assert!(service.list().await.unwrap().is_empty());

        store.fail_command("SMEMBERS");
        assert!(matches!(
            service.list().await,
            Err(AppError::StoreUnavailable(_))
        ));
    }
}
