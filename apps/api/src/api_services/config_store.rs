use std::sync::Arc;

use flowdash_application::ConfigStore;
use flowdash_core::AppError;
use flowdash_infrastructure::{InMemoryConfigStore, NacosConfigStore, RedisConfigStore};
use tracing::{info, warn};

use crate::api_config::RuleStoreConfig;

use super::redis::build_redis_client;

pub fn build_config_store(config: &RuleStoreConfig) -> Result<Arc<dyn ConfigStore>, AppError> {
    let store: Arc<dyn ConfigStore> = match config {
        RuleStoreConfig::Memory => {
            warn!("rules are kept in process memory and are lost on restart");
            Arc::new(InMemoryConfigStore::new())
        }
        RuleStoreConfig::Redis { url, key_prefix } => Arc::new(RedisConfigStore::new(
            build_redis_client(url)?,
            key_prefix.as_str(),
        )),
        RuleStoreConfig::Nacos {
            server_addr,
            namespace,
            timeout,
        } => {
            let http_client = reqwest::Client::builder()
                .timeout(*timeout)
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build config server client: {error}"))
                })?;
            Arc::new(NacosConfigStore::new(
                http_client,
                server_addr,
                namespace.clone(),
            )?)
        }
    };

    info!(backend = config.backend_name(), "rule config store ready");
    Ok(store)
}
