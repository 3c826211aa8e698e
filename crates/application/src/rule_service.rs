//! Rule CRUD over whole-list provider/publisher adapters.
//!
//! Every mutation reads the app's full rule list, edits it in memory and
//! publishes the complete list back with the revision it was read at, so a
//! concurrent writer surfaces as `AppError::Conflict`.

use std::sync::Arc;

use chrono::Utc;
use flowdash_core::{AppError, AppResult, is_blank};
use flowdash_domain::{RuleEntity, RuleKind, RuleValidationError, next_rule_id};

use crate::{DynamicRuleProvider, DynamicRulePublisher, RuleSnapshot, VersionGate};

#[cfg(test)]
mod tests;

/// Machine coordinates a rule list is requested for.
#[derive(Debug, Clone, Default)]
pub struct RuleQuery {
    /// Application name.
    pub app: Option<String>,
    /// Machine address.
    pub ip: Option<String>,
    /// Machine command port.
    pub port: Option<i32>,
}

/// Returns the client-facing message for an unsupported rule category.
#[must_use]
pub fn unsupported_message(kind: RuleKind) -> String {
    format!(
        "Sentinel client not supported for {} (unsupported version or dependency absent)",
        kind.feature_name()
    )
}

/// Application service managing the rules of one category.
pub struct RuleService<T: RuleEntity> {
    provider: Arc<dyn DynamicRuleProvider<T>>,
    publisher: Arc<dyn DynamicRulePublisher<T>>,
    version_gate: Option<VersionGate>,
}

impl<T: RuleEntity> Clone for RuleService<T> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            publisher: Arc::clone(&self.publisher),
            version_gate: self.version_gate.clone(),
        }
    }
}

impl<T: RuleEntity> RuleService<T> {
    /// Creates a service without version gating.
    #[must_use]
    pub fn new(
        provider: Arc<dyn DynamicRuleProvider<T>>,
        publisher: Arc<dyn DynamicRulePublisher<T>>,
    ) -> Self {
        Self {
            provider,
            publisher,
            version_gate: None,
        }
    }

    /// Requires target machines to pass `gate` before rules are read or written.
    #[must_use]
    pub fn with_version_gate(mut self, gate: VersionGate) -> Self {
        self.version_gate = Some(gate);
        self
    }

    /// Lists every rule of the queried app.
    pub async fn list_rules(&self, query: RuleQuery) -> AppResult<Vec<T>> {
        let app = query
            .app
            .as_deref()
            .filter(|app| !app.trim().is_empty())
            .ok_or_else(|| AppError::Validation("app cannot be null or empty".to_owned()))?;
        if is_blank(query.ip.as_deref()) {
            return Err(AppError::Validation("ip cannot be null or empty".to_owned()));
        }
        if query.port.is_none_or(|port| port <= 0) {
            return Err(AppError::Validation("Invalid parameter: port".to_owned()));
        }

        self.ensure_supported(Some(app), query.ip.as_deref(), query.port)
            .await?;

        Ok(self.fetch(app).await?.rules)
    }

    /// Validates and appends a new rule, assigning the next id.
    pub async fn add_rule(&self, mut entity: T) -> AppResult<T> {
        entity.validate()?;
        let header = entity.header();
        self.ensure_supported(header.app.as_deref(), header.ip.as_deref(), header.port)
            .await?;

        entity.normalize();
        let app = required_app(&entity)?;
        let now = Utc::now();
        let header = entity.header_mut();
        header.id = None;
        header.gmt_create = Some(now);
        header.gmt_modified = Some(now);

        let snapshot = self.fetch(&app).await?;
        let precondition = snapshot.precondition();
        let mut rules = snapshot.rules;
        let id = next_rule_id(&rules).ok_or_else(|| {
            AppError::Internal(format!("rule ids of app '{app}' are exhausted"))
        })?;
        entity.header_mut().id = Some(id);
        rules.push(entity.clone());

        self.publish(&app, &rules, precondition).await?;
        Ok(entity)
    }

    /// Overwrites the rule `id` with the request fields, keeping its id.
    pub async fn update_rule(&self, id: Option<i64>, entity: T) -> AppResult<T> {
        let id = id
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::Validation("Invalid id".to_owned()))?;
        let header = entity.header();
        self.ensure_supported(header.app.as_deref(), header.ip.as_deref(), header.port)
            .await?;
        let app = required_app(&entity)?;

        let snapshot = self.fetch(&app).await?;
        let precondition = snapshot.precondition();
        let mut rules = snapshot.rules;
        let stored = rules
            .iter_mut()
            .find(|rule| rule.id() == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("id {id} does not exist")))?;

        stored.apply_update(entity);
        stored.normalize();
        stored.validate()?;
        stored.header_mut().gmt_modified = Some(Utc::now());
        let updated = stored.clone();

        self.publish(&app, &rules, precondition).await?;
        Ok(updated)
    }

    /// Removes the rule `id` from `app`'s list and republishes the list.
    ///
    /// Deleting an id that is not stored still republishes the unchanged list.
    pub async fn delete_rule(&self, id: Option<i64>, app: Option<&str>) -> AppResult<i64> {
        let id = id.ok_or_else(|| AppError::Validation("id cannot be null".to_owned()))?;
        let app = app
            .filter(|app| !app.trim().is_empty())
            .ok_or_else(|| AppError::Validation("app cannot be null or empty".to_owned()))?;

        let snapshot = self.fetch(app).await?;
        let precondition = snapshot.precondition();
        let mut rules = snapshot.rules;
        if let Some(index) = rules.iter().position(|rule| rule.id() == Some(id)) {
            rules.remove(index);
        }

        self.publish(app, &rules, precondition).await?;
        Ok(id)
    }

    async fn ensure_supported(
        &self,
        app: Option<&str>,
        ip: Option<&str>,
        port: Option<i32>,
    ) -> AppResult<()> {
        let Some(gate) = &self.version_gate else {
            return Ok(());
        };

        if gate.is_supported(app, ip, port).await {
            Ok(())
        } else {
            Err(AppError::Unsupported(unsupported_message(T::KIND)))
        }
    }

    async fn fetch(&self, app: &str) -> AppResult<RuleSnapshot<T>> {
        self.provider
            .get_rules(app)
            .await
            .map_err(classify_store_error::<T>)
    }

    async fn publish(
        &self,
        app: &str,
        rules: &[T],
        precondition: crate::PublishPrecondition,
    ) -> AppResult<()> {
        self.publisher
            .publish(app, rules, &precondition)
            .await
            .map_err(classify_store_error::<T>)
    }
}

fn required_app<T: RuleEntity>(entity: &T) -> AppResult<String> {
    entity
        .app()
        .filter(|app| !app.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| RuleValidationError::BlankApp.into())
}

fn classify_store_error<T: RuleEntity>(error: AppError) -> AppError {
    match error {
        AppError::Unsupported(_) => AppError::Unsupported(unsupported_message(T::KIND)),
        other => other,
    }
}
