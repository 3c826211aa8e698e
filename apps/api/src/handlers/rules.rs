//! Generic CRUD handlers shared by every rule category.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use flowdash_application::{RuleQuery, RuleService};
use flowdash_core::AppError;
use flowdash_domain::{RuleEntity, RuleValidationError};
use tracing::{error, info, warn};

use crate::dto::{DeleteRuleRequest, RuleListQuery, RuleResult};
use crate::error::{ApiError, ApiResult};


pub async fn list_rules_handler<T: RuleEntity>(
    State(rule_service): State<RuleService<T>>,
    query: Result<Query<RuleListQuery>, QueryRejection>,
) -> ApiResult<Json<RuleResult<Vec<T>>>> {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    let port = query.port();
    let rules = rule_service
        .list_rules(RuleQuery {
            app: query.app,
            ip: query.ip,
            port,
        })
        .await
        .map_err(report::<T>("list", None))?;

    Ok(Json(RuleResult::ok(rules)))
}

pub async fn add_rule_handler<T: RuleEntity>(
    State(rule_service): State<RuleService<T>>,
    payload: Result<Json<T>, JsonRejection>,
) -> ApiResult<Json<RuleResult<T>>> {
    let Json(entity) = payload.map_err(bad_rule_body::<T>)?;
    let entity = rule_service
        .add_rule(entity)
        .await
        .map_err(report::<T>("add", None))?;

    info!(kind = T::KIND.as_str(), id = entity.id(), app = entity.app(), "added rule");
    Ok(Json(RuleResult::ok(entity)))
}

pub async fn update_rule_handler<T: RuleEntity>(
    State(rule_service): State<RuleService<T>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<T>, JsonRejection>,
) -> ApiResult<Json<RuleResult<T>>> {
    let id = id.ok().map(|Path(id)| id);
    let Json(entity) = payload.map_err(bad_rule_body::<T>)?;
    let entity = rule_service
        .update_rule(id, entity)
        .await
        .map_err(report::<T>("update", id))?;

    info!(kind = T::KIND.as_str(), id = entity.id(), app = entity.app(), "updated rule");
    Ok(Json(RuleResult::ok(entity)))
}

pub async fn delete_rule_handler<T: RuleEntity>(
    State(rule_service): State<RuleService<T>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DeleteRuleRequest>, JsonRejection>,
) -> ApiResult<Json<RuleResult<i64>>> {
    let id = id.ok().map(|Path(id)| id);
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let deleted = rule_service
        .delete_rule(id, request.app.as_deref())
        .await
        .map_err(report::<T>("delete", id))?;

    info!(kind = T::KIND.as_str(), id = deleted, app = request.app.as_deref(), "deleted rule");
    Ok(Json(RuleResult::ok(deleted)))
}

fn bad_rule_body<T: RuleEntity>(rejection: JsonRejection) -> ApiError {
    warn!(kind = T::KIND.as_str(), %rejection, "unreadable rule body");
    ApiError(RuleValidationError::MissingBody.into())
}

fn report<T: RuleEntity>(
    operation: &'static str,
    id: Option<i64>,
) -> impl FnOnce(AppError) -> ApiError {
    move |app_error| {
        match &app_error {
            AppError::Validation(_) | AppError::NotFound(_) => {
                warn!(kind = T::KIND.as_str(), operation, id, error = %app_error, "rule request rejected");
            }
            AppError::Conflict(_)
            | AppError::Unsupported(_)
            | AppError::Store(_)
            | AppError::Internal(_) => {
                error!(kind = T::KIND.as_str(), operation, id, error = %app_error, "rule request failed");
            }
        }
        ApiError(app_error)
    }
}
