//! Application services and ports.

#![forbid(unsafe_code)]

mod machine_service;
mod rule_ports;
mod rule_service;
mod version_gate;

pub use machine_service::{MachineDirectory, MachineHeartbeat, MachineService};
pub use rule_ports::{
    ConfigEntry, ConfigKey, ConfigRevision, ConfigStore, DynamicRuleProvider,
    DynamicRulePublisher, PublishPrecondition, RuleSnapshot,
};
pub use rule_service::{RuleQuery, RuleService, unsupported_message};
pub use version_gate::{VersionGate, VersionSupport};
