use axum::Json;
use axum::extract::{Path, Query, State};
use axum::extract::rejection::QueryRejection;
use flowdash_application::MachineService;
use tracing::{debug, warn};

use crate::dto::{MachineHeartbeatQuery, MachineResponse, RuleResult};
use crate::error::{ApiError, ApiResult};

pub async fn register_machine_handler(
    State(machine_service): State<MachineService>,
    query: Result<Query<MachineHeartbeatQuery>, QueryRejection>,
) -> ApiResult<Json<RuleResult<String>>> {
    let heartbeat = query.map(|Query(query)| query).unwrap_or_default();
    let machine = machine_service
        .register_heartbeat(heartbeat.into())
        .await
        .map_err(|error| {
            warn!(%error, "rejected machine heartbeat");
            ApiError(error)
        })?;

    debug!(
        app = machine.app().as_str(),
        ip = machine.ip().as_str(),
        port = machine.port(),
        "machine heartbeat"
    );
    Ok(Json(RuleResult::ok("success".to_owned())))
}

pub async fn list_machines_handler(
    State(machine_service): State<MachineService>,
    Path(app): Path<String>,
) -> ApiResult<Json<RuleResult<Vec<MachineResponse>>>> {
    let machines = machine_service
        .list_machines(app.as_str())
        .await?
        .into_iter()
        .map(MachineResponse::from)
        .collect();

    Ok(Json(RuleResult::ok(machines)))
}
