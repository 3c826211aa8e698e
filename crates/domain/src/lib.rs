//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod authority;
mod machine;
mod param_flow;
mod rule;
mod system;
mod version;

pub use authority::{AUTHORITY_BLACK, AUTHORITY_WHITE, AuthorityRule, AuthorityRuleEntity};
pub use machine::MachineInfo;
pub use param_flow::{
    CONTROL_BEHAVIOR_DEFAULT, CONTROL_BEHAVIOR_RATE_LIMITER, FLOW_GRADE_QPS, FLOW_GRADE_THREAD,
    LIMIT_APP_DEFAULT, ParamFlowItem, ParamFlowRule, ParamFlowRuleEntity,
};
pub use rule::{
    RuleEntity, RuleHeader, RuleKind, RuleValidationError, next_rule_id, validate_rule_entity,
};
pub use system::{SystemRuleEntity, THRESHOLD_DISABLED};
pub use version::ClientVersion;
