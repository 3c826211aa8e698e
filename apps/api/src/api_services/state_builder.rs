use std::sync::Arc;

use flowdash_application::{ConfigStore, MachineDirectory, MachineService, RuleService, VersionGate};
use flowdash_domain::{ClientVersion, RuleEntity};
use flowdash_infrastructure::ConfigStoreRuleRepository;

use crate::api_config::RuleDocumentConfig;
use crate::state::AppState;

pub fn build_app_state(
    config_store: Arc<dyn ConfigStore>,
    machine_directory: Arc<dyn MachineDirectory>,
    documents: &RuleDocumentConfig,
    param_flow_min_client_version: ClientVersion,
    rule_store_backend: &'static str,
) -> AppState {
    let version_gate = VersionGate::new(
        Arc::clone(&machine_directory),
        param_flow_min_client_version,
    );

    AppState {
        param_flow_rules: rule_service(
            &config_store,
            &documents.group,
            &documents.param_flow_postfix,
        )
        .with_version_gate(version_gate),
        system_rules: rule_service(&config_store, &documents.group, &documents.system_postfix),
        authority_rules: rule_service(
            &config_store,
            &documents.group,
            &documents.authority_postfix,
        ),
        machine_service: MachineService::new(machine_directory),
        rule_store_backend,
    }
}

fn rule_service<T: RuleEntity>(
    config_store: &Arc<dyn ConfigStore>,
    group: &str,
    data_id_postfix: &str,
) -> RuleService<T> {
    let repository = Arc::new(ConfigStoreRuleRepository::<T>::new(
        Arc::clone(config_store),
        group,
        data_id_postfix,
    ));
    RuleService::new(repository.clone(), repository)
}
