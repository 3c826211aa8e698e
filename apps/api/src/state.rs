use axum::extract::FromRef;
use flowdash_application::{MachineService, RuleService};
use flowdash_domain::{AuthorityRuleEntity, ParamFlowRuleEntity, SystemRuleEntity};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub param_flow_rules: RuleService<ParamFlowRuleEntity>,
    pub system_rules: RuleService<SystemRuleEntity>,
    pub authority_rules: RuleService<AuthorityRuleEntity>,
    pub machine_service: MachineService,
    pub rule_store_backend: &'static str,
}

impl FromRef<AppState> for RuleService<ParamFlowRuleEntity> {
    fn from_ref(state: &AppState) -> Self {
        state.param_flow_rules.clone()
    }
}

impl FromRef<AppState> for RuleService<SystemRuleEntity> {
    fn from_ref(state: &AppState) -> Self {
        state.system_rules.clone()
    }
}

impl FromRef<AppState> for RuleService<AuthorityRuleEntity> {
    fn from_ref(state: &AppState) -> Self {
        state.authority_rules.clone()
    }
}

impl FromRef<AppState> for MachineService {
    fn from_ref(state: &AppState) -> Self {
        state.machine_service.clone()
    }
}
