use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use flowdash_core::{AppError, AppResult};
use flowdash_domain::{
    ClientVersion, MachineInfo, ParamFlowRule, ParamFlowRuleEntity, RuleEntity, RuleHeader,
};
use tokio::sync::Mutex;

use crate::{
    ConfigRevision, DynamicRuleProvider, DynamicRulePublisher, MachineDirectory,
    PublishPrecondition, RuleSnapshot, VersionGate,
};

use super::{RuleQuery, RuleService, unsupported_message};

#[derive(Default)]
struct FakeRuleStore {
    rules: Mutex<Vec<ParamFlowRuleEntity>>,
    revision: Mutex<Option<ConfigRevision>>,
    reads: Mutex<usize>,
    publishes: Mutex<Vec<(String, Vec<ParamFlowRuleEntity>)>>,
    unsupported: bool,
}

impl FakeRuleStore {
    fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    async fn publish_count(&self) -> usize {
        self.publishes.lock().await.len()
    }
}

#[async_trait]
impl DynamicRuleProvider<ParamFlowRuleEntity> for FakeRuleStore {
    async fn get_rules(&self, _app: &str) -> AppResult<RuleSnapshot<ParamFlowRuleEntity>> {
        *self.reads.lock().await += 1;
        if self.unsupported {
            return Err(AppError::Unsupported(
                "command getParamFlowRules not found".to_owned(),
            ));
        }

        Ok(RuleSnapshot {
            rules: self.rules.lock().await.clone(),
            revision: self.revision.lock().await.clone(),
        })
    }
}

#[async_trait]
impl DynamicRulePublisher<ParamFlowRuleEntity> for FakeRuleStore {
    async fn publish(
        &self,
        app: &str,
        rules: &[ParamFlowRuleEntity],
        precondition: &PublishPrecondition,
    ) -> AppResult<()> {
        let mut revision = self.revision.lock().await;
        if !precondition.is_satisfied_by(revision.as_ref()) {
            return Err(AppError::Conflict(format!(
                "rules of app '{app}' changed concurrently"
            )));
        }

        let count = self.publishes.lock().await.len();
        *revision = Some(ConfigRevision::from_raw(format!("rev-{count}")));
        *self.rules.lock().await = rules.to_vec();
        self.publishes
            .lock()
            .await
            .push((app.to_owned(), rules.to_vec()));
        Ok(())
    }
}

struct SingleMachineDirectory {
    version: &'static str,
}

#[async_trait]
impl MachineDirectory for SingleMachineDirectory {
    async fn register_machine(&self, _machine: MachineInfo) -> AppResult<()> {
        Ok(())
    }

    async fn find_machine(&self, app: &str, ip: &str, port: u16) -> AppResult<Option<MachineInfo>> {
        MachineInfo::new(
            app,
            ip,
            i32::from(port),
            None,
            0,
            Some(self.version.to_owned()),
            Utc::now(),
        )
        .map(Some)
    }

    async fn list_machines(&self, _app: &str) -> AppResult<Vec<MachineInfo>> {
        Ok(Vec::new())
    }
}

fn service(store: &Arc<FakeRuleStore>) -> RuleService<ParamFlowRuleEntity> {
    RuleService::new(store.clone(), store.clone())
}

fn gated_service(
    store: &Arc<FakeRuleStore>,
    version: &'static str,
) -> RuleService<ParamFlowRuleEntity> {
    service(store).with_version_gate(VersionGate::new(
        Arc::new(SingleMachineDirectory { version }),
        ClientVersion::new(0, 2, 0),
    ))
}

fn rule(app: &str, resource: &str) -> ParamFlowRuleEntity {
    ParamFlowRuleEntity::new(
        RuleHeader::for_machine(app, "10.0.0.5", 8719),
        ParamFlowRule::new(resource, 0, 20.0),
    )
}

fn query(app: &str) -> RuleQuery {
    RuleQuery {
        app: Some(app.to_owned()),
        ip: Some("10.0.0.5".to_owned()),
        port: Some(8719),
    }
}

#[tokio::test]
async fn add_assigns_sequential_ids_and_timestamps() {
    let store = Arc::new(FakeRuleStore::default());
    let service = service(&store);

    let first = service
        .add_rule(rule("A", "foo"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = service
        .add_rule(rule("A", "bar"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(first.id(), Some(1));
    assert_eq!(second.id(), Some(2));
    assert!(first.header.gmt_create.is_some());
    assert_eq!(first.header.gmt_create, first.header.gmt_modified);
    assert_eq!(store.publish_count().await, 2);
}

#[tokio::test]
async fn add_continues_after_highest_existing_id() {
    let store = Arc::new(FakeRuleStore::default());
    let mut existing = rule("A", "legacy");
    existing.header.id = Some(41);
    *store.rules.lock().await = vec![existing];

    let added = service(&store)
        .add_rule(rule("A", "fresh"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(added.id(), Some(42));
}

#[tokio::test]
async fn add_fails_when_ids_are_exhausted() {
    let store = Arc::new(FakeRuleStore::default());
    let mut existing = rule("A", "legacy");
    existing.header.id = Some(i64::MAX);
    *store.rules.lock().await = vec![existing];

    let result = service(&store).add_rule(rule("A", "fresh")).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(store.publish_count().await, 0);
}

#[tokio::test]
async fn add_ignores_client_supplied_id_and_trims_resource() {
    let store = Arc::new(FakeRuleStore::default());
    let mut entity = rule("A", "  GET:/orders  ");
    entity.header.id = Some(99);

    let added = service(&store)
        .add_rule(entity)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(added.id(), Some(1));
    assert_eq!(added.resource(), Some("GET:/orders"));
}

#[tokio::test]
async fn invalid_rule_never_reaches_store() {
    let store = Arc::new(FakeRuleStore::default());
    let mut entity = rule("A", "foo");
    if let Some(payload) = entity.rule.as_mut() {
        payload.count = -1.0;
    }

    let result = service(&store).add_rule(entity).await;

    assert!(matches!(
        result,
        Err(AppError::Validation(message)) if message == "count should be valid"
    ));
    assert_eq!(*store.reads.lock().await, 0);
    assert_eq!(store.publish_count().await, 0);
}

#[tokio::test]
async fn delete_then_list_keeps_remaining_rule() {
    let store = Arc::new(FakeRuleStore::default());
    let service = service(&store);
    for resource in ["foo", "bar"] {
        service
            .add_rule(rule("A", resource))
            .await
            .unwrap_or_else(|_| unreachable!());
    }

    let deleted = service
        .delete_rule(Some(1), Some("A"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let remaining = service
        .list_rules(query("A"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(deleted, 1);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), Some(2));
    assert_eq!(remaining[0].resource(), Some("bar"));
}

#[tokio::test]
async fn delete_missing_id_republishes_unchanged_list() {
    let store = Arc::new(FakeRuleStore::default());
    let service = service(&store);
    service
        .add_rule(rule("A", "foo"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let deleted = service
        .delete_rule(Some(404), Some("A"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(deleted, 404);
    let publishes = store.publishes.lock().await;
    assert_eq!(publishes.len(), 2);
    assert_eq!(publishes[1].1, publishes[0].1);
}

#[tokio::test]
async fn delete_requires_id() {
    let store = Arc::new(FakeRuleStore::default());
    let result = service(&store).delete_rule(None, Some("A")).await;

    assert!(matches!(
        result,
        Err(AppError::Validation(message)) if message == "id cannot be null"
    ));
}

#[tokio::test]
async fn update_copies_fields_but_keeps_identity() {
    let store = Arc::new(FakeRuleStore::default());
    let service = service(&store);
    let added = service
        .add_rule(rule("A", "foo"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let mut change = rule("A", "foo");
    change.header.id = Some(77);
    if let Some(payload) = change.rule.as_mut() {
        payload.count = 500.0;
        payload.duration_in_sec = 5;
    }

    let updated = service
        .update_rule(Some(1), change)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.id(), Some(1));
    assert_eq!(updated.header.gmt_create, added.header.gmt_create);
    assert!(updated.header.gmt_modified >= added.header.gmt_modified);
    let payload = updated.rule.clone().unwrap_or_else(|| unreachable!());
    assert_eq!(payload.count, 500.0);
    assert_eq!(payload.duration_in_sec, 5);
    assert_eq!(store.rules.lock().await.clone(), vec![updated]);
}

#[tokio::test]
async fn update_missing_id_is_not_found_without_publish() {
    let store = Arc::new(FakeRuleStore::default());
    let service = service(&store);
    service
        .add_rule(rule("A", "foo"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = service.update_rule(Some(9), rule("A", "foo")).await;

    assert!(matches!(
        result,
        Err(AppError::NotFound(message)) if message == "id 9 does not exist"
    ));
    assert_eq!(store.publish_count().await, 1);
}

#[tokio::test]
async fn update_rejects_invalid_merged_rule() {
    let store = Arc::new(FakeRuleStore::default());
    let service = service(&store);
    service
        .add_rule(rule("A", "foo"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let mut change = rule("A", "foo");
    if let Some(payload) = change.rule.as_mut() {
        payload.param_idx = Some(-3);
    }

    let result = service.update_rule(Some(1), change).await;
    assert!(matches!(
        result,
        Err(AppError::Validation(message)) if message == "paramIdx should be valid"
    ));
    assert_eq!(store.publish_count().await, 1);
}

#[tokio::test]
async fn update_requires_positive_id() {
    let store = Arc::new(FakeRuleStore::default());
    let result = service(&store).update_rule(Some(0), rule("A", "foo")).await;

    assert!(matches!(
        result,
        Err(AppError::Validation(message)) if message == "Invalid id"
    ));
    assert_eq!(*store.reads.lock().await, 0);
}

#[tokio::test]
async fn list_validates_query_in_order() {
    let store = Arc::new(FakeRuleStore::default());
    let service = service(&store);

    let cases = [
        (RuleQuery::default(), "app cannot be null or empty"),
        (
            RuleQuery {
                app: Some("A".to_owned()),
                ..RuleQuery::default()
            },
            "ip cannot be null or empty",
        ),
        (
            RuleQuery {
                port: Some(0),
                ..query("A")
            },
            "Invalid parameter: port",
        ),
    ];

    for (query, expected) in cases {
        let result = service.list_rules(query).await;
        assert!(matches!(
            result,
            Err(AppError::Validation(message)) if message == expected
        ));
    }
    assert_eq!(*store.reads.lock().await, 0);
}

#[tokio::test]
async fn outdated_client_is_rejected_before_store_access() {
    let store = Arc::new(FakeRuleStore::default());
    let service = gated_service(&store, "0.1.1");

    let listed = service.list_rules(query("A")).await;
    let added = service.add_rule(rule("A", "foo")).await;

    let expected = unsupported_message(flowdash_domain::RuleKind::ParamFlow);
    assert!(matches!(listed, Err(AppError::Unsupported(ref message)) if *message == expected));
    assert!(matches!(added, Err(AppError::Unsupported(ref message)) if *message == expected));
    assert_eq!(*store.reads.lock().await, 0);
}

#[tokio::test]
async fn current_client_passes_gate() {
    let store = Arc::new(FakeRuleStore::default());
    let service = gated_service(&store, "1.8.6");

    let added = service.add_rule(rule("A", "foo")).await;
    assert!(added.is_ok());
}

#[tokio::test]
async fn store_unsupported_operation_is_classified() {
    let store = Arc::new(FakeRuleStore::unsupported());
    let result = service(&store).list_rules(query("A")).await;

    assert!(matches!(
        result,
        Err(AppError::Unsupported(message))
            if message.starts_with("Sentinel client not supported for parameter flow control")
    ));
}

#[tokio::test]
async fn stale_snapshot_publish_is_a_conflict() {
    let store = Arc::new(FakeRuleStore::default());
    let service = service(&store);
    service
        .add_rule(rule("A", "foo"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let stale = store
        .get_rules("A")
        .await
        .unwrap_or_else(|_| unreachable!());
    service
        .add_rule(rule("A", "bar"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = store.publish("A", &stale.rules, &stale.precondition()).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(store.rules.lock().await.len(), 2);
}
