use flowdash_application::MachineHeartbeat;
use flowdash_domain::MachineInfo;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Heartbeat parameters sent by client agents.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/machine-heartbeat-query.ts"
)]
pub struct MachineHeartbeatQuery {
    pub app: Option<String>,
    pub app_type: Option<String>,
    pub version: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub port: Option<String>,
}

impl From<MachineHeartbeatQuery> for MachineHeartbeat {
    fn from(query: MachineHeartbeatQuery) -> Self {
        Self {
            app: query.app,
            app_type: query
                .app_type
                .and_then(|value| value.trim().parse::<i32>().ok()),
            version: query.version,
            hostname: query.hostname,
            ip: query.ip,
            port: query.port.and_then(|value| value.trim().parse::<i32>().ok()),
        }
    }
}

/// API representation of a registered machine.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/machine-response.ts"
)]
pub struct MachineResponse {
    pub app: String,
    pub ip: String,
    pub port: u16,
    pub hostname: Option<String>,
    pub app_type: i32,
    pub version: Option<String>,
    #[ts(type = "number")]
    pub last_heartbeat: i64,
}

impl From<MachineInfo> for MachineResponse {
    fn from(machine: MachineInfo) -> Self {
        Self {
            app: machine.app().as_str().to_owned(),
            ip: machine.ip().as_str().to_owned(),
            port: machine.port(),
            hostname: machine.hostname().map(ToOwned::to_owned),
            app_type: machine.app_type(),
            version: machine.version().map(ToOwned::to_owned),
            last_heartbeat: machine.last_heartbeat().timestamp_millis(),
        }
    }
}
