use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use flowdash_core::AppResult;
use flowdash_domain::RuleEntity;
use sha2::{Digest, Sha256};

/// Address of one document in the remote configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    data_id: String,
    group: String,
}

impl ConfigKey {
    /// Creates a key from a data id and group.
    #[must_use]
    pub fn new(data_id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            group: group.into(),
        }
    }

    /// Returns the data id.
    #[must_use]
    pub fn data_id(&self) -> &str {
        self.data_id.as_str()
    }

    /// Returns the group.
    #[must_use]
    pub fn group(&self) -> &str {
        self.group.as_str()
    }
}

impl Display for ConfigKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}/{}", self.group, self.data_id)
    }
}

/// Opaque token identifying one stored version of a config document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigRevision(String);

impl ConfigRevision {
    /// Derives the revision of a document from its content.
    #[must_use]
    pub fn of_content(content: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(content.as_bytes())))
    }

    /// Wraps a revision value reported by a store.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Stored config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Raw document content.
    pub content: String,
    /// Revision of `content`.
    pub revision: ConfigRevision,
}

impl ConfigEntry {
    /// Creates an entry with a content-derived revision.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let revision = ConfigRevision::of_content(&content);
        Self { content, revision }
    }
}

/// Condition a write must satisfy to replace the stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishPrecondition {
    /// Overwrite unconditionally.
    Any,
    /// Only create; fail when a document already exists.
    Absent,
    /// Only replace the given revision.
    Matches(ConfigRevision),
}

impl PublishPrecondition {
    /// Returns whether a store holding `current` accepts the write.
    #[must_use]
    pub fn is_satisfied_by(&self, current: Option<&ConfigRevision>) -> bool {
        match (self, current) {
            (Self::Any, _) => true,
            (Self::Absent, current) => current.is_none(),
            (Self::Matches(expected), Some(current)) => expected == current,
            (Self::Matches(_), None) => false,
        }
    }
}

/// Remote configuration service holding whole documents by key.
///
/// Adapters report a capability the remote side lacks as
/// `AppError::Unsupported` and any other remote failure as `AppError::Store`.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads one document, `None` when it does not exist.
    async fn read(&self, key: &ConfigKey) -> AppResult<Option<ConfigEntry>>;

    /// Replaces one document in a single write and returns the new revision.
    ///
    /// Fails with `AppError::Conflict` when `precondition` does not hold.
    async fn write(
        &self,
        key: &ConfigKey,
        content: String,
        precondition: &PublishPrecondition,
    ) -> AppResult<ConfigRevision>;
}

/// Full rule list of one app together with the revision it was read at.
#[derive(Debug, Clone)]
pub struct RuleSnapshot<T> {
    /// Rules in stored order.
    pub rules: Vec<T>,
    /// Revision of the stored document, `None` when nothing was stored yet.
    pub revision: Option<ConfigRevision>,
}

impl<T> RuleSnapshot<T> {
    /// Returns the precondition that publishes only over this snapshot.
    #[must_use]
    pub fn precondition(&self) -> PublishPrecondition {
        match &self.revision {
            Some(revision) => PublishPrecondition::Matches(revision.clone()),
            None => PublishPrecondition::Absent,
        }
    }
}

/// Reads the rule list of one app.
#[async_trait]
pub trait DynamicRuleProvider<T: RuleEntity>: Send + Sync {
    /// Returns every rule stored for `app`.
    async fn get_rules(&self, app: &str) -> AppResult<RuleSnapshot<T>>;
}

/// Replaces the rule list of one app.
#[async_trait]
pub trait DynamicRulePublisher<T: RuleEntity>: Send + Sync {
    /// Stores `rules` as the complete list for `app`.
    async fn publish(
        &self,
        app: &str,
        rules: &[T],
        precondition: &PublishPrecondition,
    ) -> AppResult<()>;
}
