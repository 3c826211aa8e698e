use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use flowdash_application::{
    ConfigKey, ConfigStore, DynamicRuleProvider, DynamicRulePublisher, PublishPrecondition,
    RuleSnapshot,
};
use flowdash_core::{AppError, AppResult};
use flowdash_domain::RuleEntity;
use tracing::info;

/// Rule provider and publisher storing each app's rules as one JSON document.
///
/// The document of app `A` lives under data id `A` + postfix in a fixed group.
pub struct ConfigStoreRuleRepository<T> {
    store: Arc<dyn ConfigStore>,
    group: String,
    data_id_postfix: String,
    entity: PhantomData<fn() -> T>,
}

impl<T> ConfigStoreRuleRepository<T> {
    /// Creates a repository over `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn ConfigStore>,
        group: impl Into<String>,
        data_id_postfix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            group: group.into(),
            data_id_postfix: data_id_postfix.into(),
            entity: PhantomData,
        }
    }

    fn key_for(&self, app: &str) -> ConfigKey {
        ConfigKey::new(format!("{app}{}", self.data_id_postfix), self.group.as_str())
    }
}

#[async_trait]
impl<T: RuleEntity> DynamicRuleProvider<T> for ConfigStoreRuleRepository<T> {
    async fn get_rules(&self, app: &str) -> AppResult<RuleSnapshot<T>> {
        let key = self.key_for(app);
        let Some(entry) = self.store.read(&key).await? else {
            return Ok(RuleSnapshot {
                rules: Vec::new(),
                revision: None,
            });
        };

        let rules = if entry.content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Vec<T>>(&entry.content).map_err(|error| {
                AppError::Internal(format!(
                    "stored {} document '{key}' is not a valid rule list: {error}",
                    T::KIND.as_str()
                ))
            })?
        };

        Ok(RuleSnapshot {
            rules,
            revision: Some(entry.revision),
        })
    }
}

#[async_trait]
impl<T: RuleEntity> DynamicRulePublisher<T> for ConfigStoreRuleRepository<T> {
    async fn publish(
        &self,
        app: &str,
        rules: &[T],
        precondition: &PublishPrecondition,
    ) -> AppResult<()> {
        let key = self.key_for(app);
        let content = serde_json::to_string_pretty(rules).map_err(|error| {
            AppError::Internal(format!("failed to encode rules for '{key}': {error}"))
        })?;

        self.store.write(&key, content, precondition).await?;
        info!(
            config = %key,
            kind = T::KIND.as_str(),
            rule_count = rules.len(),
            "published rules"
        );

        Ok(())
    }
}
