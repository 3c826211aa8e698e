mod config_store;
mod redis;
mod state_builder;

pub use config_store::build_config_store;
pub use state_builder::build_app_state;
