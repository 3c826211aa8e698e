use flowdash_core::is_blank;
use serde::{Deserialize, Serialize};

use crate::rule::{RuleEntity, RuleHeader, RuleKind, RuleValidationError};

/// Only listed origins may pass.
pub const AUTHORITY_WHITE: i32 = 0;
/// Listed origins are blocked.
pub const AUTHORITY_BLACK: i32 = 1;

/// Origin-based access rule payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorityRule {
    /// Guarded resource name.
    pub resource: Option<String>,
    /// Comma-separated caller origins.
    pub limit_app: Option<String>,
    /// [`AUTHORITY_WHITE`] or [`AUTHORITY_BLACK`].
    pub strategy: i32,
}

/// Authority rule as stored by the dashboard for one app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityRuleEntity {
    /// Identity and bookkeeping fields.
    #[serde(flatten)]
    pub header: RuleHeader,
    /// Rule payload pushed to client agents.
    #[serde(default)]
    pub rule: Option<AuthorityRule>,
}

impl RuleEntity for AuthorityRuleEntity {
    const KIND: RuleKind = RuleKind::Authority;

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
        if is_blank(rule.limit_app.as_deref()) {
            return Err(RuleValidationError::BlankLimitApp);
        }
        if rule.strategy != AUTHORITY_WHITE && rule.strategy != AUTHORITY_BLACK {
            return Err(RuleValidationError::InvalidStrategy);
        }

        Ok(())
    }

    fn normalize(&mut self) {
        if let Some(rule) = self.rule.as_mut() {
            rule.resource = rule.resource.as_deref().map(|value| value.trim().to_owned());
            rule.limit_app = rule.limit_app.as_deref().map(|value| value.trim().to_owned());
        }
    }
}
