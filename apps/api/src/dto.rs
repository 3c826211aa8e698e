mod envelope;
mod machines;
mod rules;

pub use envelope::{CODE_FAILURE, CODE_UNSUPPORTED, HealthResponse, RuleResult};
pub use machines::{MachineHeartbeatQuery, MachineResponse};
pub use rules::{DeleteRuleRequest, RuleListQuery};
