use flowdash_core::is_blank;
use serde::{Deserialize, Serialize};

use crate::rule::{RuleEntity, RuleHeader, RuleKind, RuleValidationError};

/// Flow grade counting concurrent threads.
pub const FLOW_GRADE_THREAD: i32 = 0;
/// Flow grade counting requests per second. The only grade parameter flow rules accept.
pub const FLOW_GRADE_QPS: i32 = 1;

/// Rejects excess requests immediately.
pub const CONTROL_BEHAVIOR_DEFAULT: i32 = 0;
/// Queues excess requests at a uniform rate.
pub const CONTROL_BEHAVIOR_RATE_LIMITER: i32 = 2;

/// Origin wildcard matching every caller.
pub const LIMIT_APP_DEFAULT: &str = "default";

/// Threshold override for one specific parameter value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamFlowItem {
    /// Parameter value rendered as a string.
    pub object: String,
    /// Threshold applied when the parameter equals `object`.
    pub count: i32,
    /// Java-style class name of the parameter value (e.g. `java.lang.String`).
    pub class_type: String,
}

/// Hot-parameter flow rule payload evaluated by client agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamFlowRule {
    /// Guarded resource name.
    pub resource: Option<String>,
    /// Caller origin the rule applies to.
    pub limit_app: String,
    /// Counting mode, see [`FLOW_GRADE_QPS`].
    pub grade: i32,
    /// Index of the hot parameter in the resource invocation.
    pub param_idx: Option<i32>,
    /// Threshold per statistic window.
    pub count: f64,
    /// Behavior for requests above the threshold.
    pub control_behavior: i32,
    /// Longest queueing time for the rate limiter behavior.
    pub max_queueing_time_ms: i32,
    /// Extra requests tolerated in bursts.
    pub burst_count: i32,
    /// Statistic window length in seconds.
    pub duration_in_sec: i64,
    /// Per-value threshold overrides.
    pub param_flow_item_list: Vec<ParamFlowItem>,
    /// Whether the threshold is enforced cluster-wide.
    pub cluster_mode: bool,
}

impl Default for ParamFlowRule {
    fn default() -> Self {
        Self {
            resource: None,
            limit_app: LIMIT_APP_DEFAULT.to_owned(),
            grade: FLOW_GRADE_QPS,
            param_idx: None,
            count: 0.0,
            control_behavior: CONTROL_BEHAVIOR_DEFAULT,
            max_queueing_time_ms: 0,
            burst_count: 0,
            duration_in_sec: 1,
            param_flow_item_list: Vec::new(),
            cluster_mode: false,
        }
    }
}

impl ParamFlowRule {
    /// Creates a QPS rule for `resource` limiting parameter `param_idx` to `count`.
    #[must_use]
    pub fn new(resource: impl Into<String>, param_idx: i32, count: f64) -> Self {
        Self {
            resource: Some(resource.into()),
            param_idx: Some(param_idx),
            count,
            ..Self::default()
        }
    }
}

/// Parameter flow rule as stored by the dashboard for one app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamFlowRuleEntity {
    /// Identity and bookkeeping fields.
    #[serde(flatten)]
    pub header: RuleHeader,
    /// Rule payload pushed to client agents.
    #[serde(default)]
    pub rule: Option<ParamFlowRule>,
}

impl ParamFlowRuleEntity {
    /// Creates an entity addressing one machine.
    #[must_use]
    pub fn new(header: RuleHeader, rule: ParamFlowRule) -> Self {
        Self {
            header,
            rule: Some(rule),
        }
    }

    /// Returns the guarded resource name.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.rule.as_ref().and_then(|rule| rule.resource.as_deref())
    }
}

impl RuleEntity for ParamFlowRuleEntity {
    const KIND: RuleKind = RuleKind::ParamFlow;

    fn header(&self) -> &RuleHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RuleHeader {
        &mut self.header
    }

    fn validate(&self) -> Result<(), RuleValidationError> {
        self.header.validate_target()?;

        let rule = self.rule.as_ref().ok_or(RuleValidationError::MissingRule)?;
        if is_blank(rule.resource.as_deref()) {
            return Err(RuleValidationError::BlankResource);
        }
        if rule.count < 0.0 {
            return Err(RuleValidationError::InvalidCount);
        }
        if rule.grade != FLOW_GRADE_QPS {
            return Err(RuleValidationError::UnsupportedGrade);
        }
        if rule.param_idx.is_none_or(|param_idx| param_idx < 0) {
            return Err(RuleValidationError::InvalidParamIdx);
        }
        if rule.duration_in_sec <= 0 {
            return Err(RuleValidationError::InvalidDuration);
        }
        if rule.control_behavior < 0 {
            return Err(RuleValidationError::InvalidControlBehavior);
        }

        Ok(())
    }

    fn normalize(&mut self) {
        if let Some(resource) = self.rule.as_mut().and_then(|rule| rule.resource.as_mut()) {
            let trimmed = resource.trim();
            if trimmed.len() != resource.len() {
                *resource = trimmed.to_owned();
            }
        }
    }
}
