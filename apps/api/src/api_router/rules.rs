use axum::Router;
use axum::extract::FromRef;
use axum::routing::{get, post, put};
use flowdash_application::RuleService;
use flowdash_domain::RuleEntity;

use crate::handlers::rules;
use crate::state::AppState;

/// Routes serving one rule category, nested under its prefix.
pub(super) fn rule_routes<T>() -> Router<AppState>
where
    T: RuleEntity,
    RuleService<T>: FromRef<AppState>,
{
    Router::new()
        .route("/rules", get(rules::list_rules_handler::<T>))
        .route("/rule", post(rules::add_rule_handler::<T>))
        .route(
            "/rule/{id}",
            put(rules::update_rule_handler::<T>).delete(rules::delete_rule_handler::<T>),
        )
}
