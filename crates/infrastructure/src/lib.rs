//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod config_store_rule_repository;
mod in_memory_config_store;
mod in_memory_machine_directory;
mod nacos_config_store;
mod redis_config_store;

pub use config_store_rule_repository::ConfigStoreRuleRepository;
pub use in_memory_config_store::InMemoryConfigStore;
pub use in_memory_machine_directory::InMemoryMachineDirectory;
pub use nacos_config_store::NacosConfigStore;
pub use redis_config_store::RedisConfigStore;
