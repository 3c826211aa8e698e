use serde::Serialize;
use ts_rs::TS;

/// Envelope code of a successful call.
pub const CODE_SUCCESS: i32 = 0;
/// Envelope code of any failure without a dedicated code.
pub const CODE_FAILURE: i32 = -1;
/// Envelope code of an operation the client agent or store cannot serve.
pub const CODE_UNSUPPORTED: i32 = 4041;

/// Result envelope returned by every dashboard rule endpoint.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rule-result.ts"
)]
pub struct RuleResult<T> {
    pub success: bool,
    pub code: i32,
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> RuleResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            code: CODE_SUCCESS,
            msg: None,
            data: Some(data),
        }
    }

    pub fn failure(code: i32, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rule_store: &'static str,
}
