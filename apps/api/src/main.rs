//! Flowdash API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use flowdash_core::AppError;
use flowdash_infrastructure::InMemoryMachineDirectory;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, build_config_store};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let config_store = build_config_store(&config.rule_store)?;
    let app_state = build_app_state(
        config_store,
        Arc::new(InMemoryMachineDirectory::new()),
        &config.rule_documents,
        config.param_flow_min_client_version.clone(),
        config.rule_store.backend_name(),
    );
    let app = build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(
        %address,
        rule_store = config.rule_store.backend_name(),
        param_flow_min_client_version = %config.param_flow_min_client_version,
        "flowdash-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("API server error: {error}")))
}
