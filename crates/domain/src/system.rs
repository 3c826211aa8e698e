use serde::{Deserialize, Serialize};

use crate::rule::{RuleEntity, RuleHeader, RuleKind, RuleValidationError};

/// Value marking a system threshold as disabled.
pub const THRESHOLD_DISABLED: f64 = -1.0;

/// Adaptive system protection rule for one app.
///
/// Each threshold is independent; a negative value disables it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemRuleEntity {
    /// Identity and bookkeeping fields.
    #[serde(flatten)]
    pub header: RuleHeader,
    /// Highest tolerated `load1` of the host.
    #[serde(default = "disabled")]
    pub highest_system_load: f64,
    /// Highest tolerated CPU usage ratio in `[0, 1]`.
    #[serde(default = "disabled")]
    pub highest_cpu_usage: f64,
    /// Highest inbound QPS.
    #[serde(default = "disabled")]
    pub qps: f64,
    /// Highest average response time in milliseconds.
    #[serde(default = "disabled_integer")]
    pub avg_rt: i64,
    /// Highest number of concurrent inbound threads.
    #[serde(default = "disabled_integer")]
    pub max_thread: i64,
}

fn disabled() -> f64 {
    THRESHOLD_DISABLED
}

fn disabled_integer() -> i64 {
    -1
}

impl Default for SystemRuleEntity {
    fn default() -> Self {
        Self {
            header: RuleHeader::default(),
            highest_system_load: THRESHOLD_DISABLED,
            highest_cpu_usage: THRESHOLD_DISABLED,
            qps: THRESHOLD_DISABLED,
            avg_rt: -1,
            max_thread: -1,
        }
    }
}

impl SystemRuleEntity {
    fn has_enabled_threshold(&self) -> bool {
        self.highest_system_load >= 0.0
            || self.highest_cpu_usage >= 0.0
            || self.qps >= 0.0
            || self.avg_rt >= 0
            || self.max_thread >= 0
    }
}

impl RuleEntity for SystemRuleEntity {
    const KIND: RuleKind = RuleKind::System;

    fn header(&self) -> &RuleHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RuleHeader {
        &mut self.header
    }

    fn validate(&self) -> Result<(), RuleValidationError> {
        self.header.validate_target()?;

        if !self.has_enabled_threshold() {
            return Err(RuleValidationError::NoSystemThreshold);
        }
        if self.highest_cpu_usage > 1.0 {
            return Err(RuleValidationError::InvalidCpuUsage);
        }

        Ok(())
    }
}
