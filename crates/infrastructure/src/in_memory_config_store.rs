use std::collections::HashMap;

use async_trait::async_trait;
use flowdash_application::{
    ConfigEntry, ConfigKey, ConfigRevision, ConfigStore, PublishPrecondition,
};
use flowdash_core::{AppError, AppResult};
use tokio::sync::RwLock;

/// In-memory config store adapter.
///
/// Preconditions are checked under the write lock, so concurrent writers
/// observe strict compare-and-swap semantics.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    entries: RwLock<HashMap<ConfigKey, ConfigEntry>>,
}

impl InMemoryConfigStore {
    /// Creates an empty in-memory config store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn read(&self, key: &ConfigKey) -> AppResult<Option<ConfigEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(
        &self,
        key: &ConfigKey,
        content: String,
        precondition: &PublishPrecondition,
    ) -> AppResult<ConfigRevision> {
        let mut entries = self.entries.write().await;
        let current = entries.get(key).map(|entry| &entry.revision);
        if !precondition.is_satisfied_by(current) {
            return Err(AppError::Conflict(format!(
                "config '{key}' was modified concurrently"
            )));
        }

        let entry = ConfigEntry::new(content);
        let revision = entry.revision.clone();
        entries.insert(key.clone(), entry);

        Ok(revision)
    }
}

#[cfg(test)]
mod tests {
    use flowdash_application::{ConfigKey, ConfigStore, PublishPrecondition};
    use flowdash_core::AppError;

    use super::InMemoryConfigStore;

    #[tokio::test]
    async fn write_then_read_returns_same_revision() {
        let store = InMemoryConfigStore::new();
        let key = ConfigKey::new("checkout-param-rules", "SENTINEL_GROUP");

        let revision = store
            .write(&key, "[]".to_owned(), &PublishPrecondition::Absent)
            .await
            .unwrap_or_else(|_| unreachable!());
        let entry = store
            .read(&key)
            .await
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|| unreachable!());

        assert_eq!(entry.content, "[]");
        assert_eq!(entry.revision, revision);
    }

    #[tokio::test]
    async fn stale_revision_is_rejected() {
        let store = InMemoryConfigStore::new();
        let key = ConfigKey::new("checkout-param-rules", "SENTINEL_GROUP");
        let first = store
            .write(&key, "[]".to_owned(), &PublishPrecondition::Any)
            .await
            .unwrap_or_else(|_| unreachable!());
        store
            .write(
                &key,
                "[{\"id\":1}]".to_owned(),
                &PublishPrecondition::Matches(first.clone()),
            )
            .await
            .unwrap_or_else(|_| unreachable!());

        let result = store
            .write(&key, "[]".to_owned(), &PublishPrecondition::Matches(first))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let again = store
            .write(&key, "[]".to_owned(), &PublishPrecondition::Absent)
            .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }
}
