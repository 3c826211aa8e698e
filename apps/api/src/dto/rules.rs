use serde::Deserialize;
use ts_rs::TS;

/// Query string of the rule list endpoints.
///
/// The port stays textual so a malformed value reaches validation instead of
/// failing extraction.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rule-list-query.ts"
)]
pub struct RuleListQuery {
    pub app: Option<String>,
    pub ip: Option<String>,
    pub port: Option<String>,
}

impl RuleListQuery {
    pub fn port(&self) -> Option<i32> {
        self.port
            .as_deref()
            .and_then(|port| port.trim().parse::<i32>().ok())
    }
}

/// Body of the rule delete endpoints.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/delete-rule-request.ts"
)]
pub struct DeleteRuleRequest {
    pub app: Option<String>,
}
