use axum::Router;
use axum::routing::{get, post};
use flowdash_core::AppError;
use flowdash_domain::{AuthorityRuleEntity, ParamFlowRuleEntity, SystemRuleEntity};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;
mod rules;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/registry/machine",
            post(handlers::machines::register_machine_handler),
        )
        .route(
            "/app/{app}/machines",
            get(handlers::machines::list_machines_handler),
        )
        .nest("/paramFlow", rules::rule_routes::<ParamFlowRuleEntity>())
        .nest("/system", rules::rule_routes::<SystemRuleEntity>())
        .nest("/authority", rules::rule_routes::<AuthorityRuleEntity>())
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
