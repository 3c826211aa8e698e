use chrono::{DateTime, Utc};
use flowdash_core::{AppError, is_blank};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule categories managed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Hot-parameter flow control rules.
    ParamFlow,
    /// Adaptive system protection rules.
    System,
    /// Origin-based authority (white/black list) rules.
    Authority,
}

impl RuleKind {
    /// Returns a stable identifier for logs and storage keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParamFlow => "param_flow",
            Self::System => "system",
            Self::Authority => "authority",
        }
    }

    /// Returns the human readable feature name used in client-facing messages.
    #[must_use]
    pub fn feature_name(self) -> &'static str {
        match self {
            Self::ParamFlow => "parameter flow control",
            Self::System => "system rules",
            Self::Authority => "authority rules",
        }
    }
}

/// Identity and bookkeeping fields shared by every rule entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleHeader {
    /// Ordinal unique within one app's rule list.
    #[serde(default)]
    pub id: Option<i64>,
    /// Owning application name.
    #[serde(default)]
    pub app: Option<String>,
    /// Address of the machine the rule was created for.
    #[serde(default)]
    pub ip: Option<String>,
    /// Command port of the machine the rule was created for.
    #[serde(default)]
    pub port: Option<i32>,
    /// Creation timestamp, epoch milliseconds on the wire.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub gmt_create: Option<DateTime<Utc>>,
    /// Last modification timestamp, epoch milliseconds on the wire.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub gmt_modified: Option<DateTime<Utc>>,
}

impl RuleHeader {
    /// Creates a header addressing one machine of an app.
    #[must_use]
    pub fn for_machine(app: impl Into<String>, ip: impl Into<String>, port: i32) -> Self {
        Self {
            app: Some(app.into()),
            ip: Some(ip.into()),
            port: Some(port),
            ..Self::default()
        }
    }

    /// Checks that the rule addresses a concrete machine.
    pub fn validate_target(&self) -> Result<(), RuleValidationError> {
        if is_blank(self.app.as_deref()) {
            return Err(RuleValidationError::BlankApp);
        }
        if is_blank(self.ip.as_deref()) {
            return Err(RuleValidationError::BlankIp);
        }
        if self.port.is_none_or(|port| port <= 0) {
            return Err(RuleValidationError::InvalidPort);
        }

        Ok(())
    }
}

/// Reasons a rule payload is rejected before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleValidationError {
    /// Request body is missing or not a rule.
    #[error("bad rule body")]
    MissingBody,
    /// Blank application name.
    #[error("app can't be null or empty")]
    BlankApp,
    /// Blank machine address.
    #[error("ip can't be null or empty")]
    BlankIp,
    /// Missing or non-positive port.
    #[error("port can't be null")]
    InvalidPort,
    /// Missing rule payload.
    #[error("rule can't be null")]
    MissingRule,
    /// Blank resource name.
    #[error("resource name cannot be null or empty")]
    BlankResource,
    /// Negative threshold.
    #[error("count should be valid")]
    InvalidCount,
    /// Grade other than QPS for a parameter flow rule.
    #[error("Unknown mode (blockGrade) for parameter flow control")]
    UnsupportedGrade,
    /// Missing or negative parameter index.
    #[error("paramIdx should be valid")]
    InvalidParamIdx,
    /// Non-positive statistic window.
    #[error("durationInSec should be valid")]
    InvalidDuration,
    /// Negative control behavior code.
    #[error("controlBehavior should be valid")]
    InvalidControlBehavior,
    /// Every system threshold is disabled.
    #[error("at least one system threshold should be set")]
    NoSystemThreshold,
    /// CPU usage threshold outside `[0, 1]`.
    #[error("highestCpuUsage should be in [0, 1]")]
    InvalidCpuUsage,
    /// Blank origin list for an authority rule.
    #[error("limitApp can't be null or empty")]
    BlankLimitApp,
    /// Authority strategy other than white or black list.
    #[error("strategy should be 0 (white list) or 1 (black list)")]
    InvalidStrategy,
}

impl From<RuleValidationError> for AppError {
    fn from(value: RuleValidationError) -> Self {
        AppError::Validation(value.to_string())
    }
}

/// A rule record stored as part of an app's rule list.
pub trait RuleEntity:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Category the entity belongs to.
    const KIND: RuleKind;

    /// Returns shared identity fields.
    fn header(&self) -> &RuleHeader;

    /// Returns shared identity fields for mutation.
    fn header_mut(&mut self) -> &mut RuleHeader;

    /// Checks the entity field by field, stopping at the first violation.
    fn validate(&self) -> Result<(), RuleValidationError>;

    /// Canonicalizes user input before the entity is stored.
    fn normalize(&mut self) {}

    /// Returns the rule id.
    fn id(&self) -> Option<i64> {
        self.header().id
    }

    /// Returns the owning application name.
    fn app(&self) -> Option<&str> {
        self.header().app.as_deref()
    }

    /// Replaces this entity with `incoming`, keeping the stored id and creation time.
    fn apply_update(&mut self, mut incoming: Self) {
        let header = incoming.header_mut();
        header.id = self.header().id;
        header.gmt_create = self.header().gmt_create;
        *self = incoming;
    }
}

/// Validates an optional request body.
pub fn validate_rule_entity<T: RuleEntity>(entity: Option<&T>) -> Result<(), RuleValidationError> {
    entity.ok_or(RuleValidationError::MissingBody)?.validate()
}

/// Returns the id the next rule in `rules` receives.
///
/// Ids start from a base of zero, so an empty list yields `1`. Returns `None`
/// once the largest stored id is `i64::MAX`.
#[must_use]
pub fn next_rule_id<T: RuleEntity>(rules: &[T]) -> Option<i64> {
    rules
        .iter()
        .filter_map(RuleEntity::id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
}
