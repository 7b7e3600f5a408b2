//! Provision, observe, tear down

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use loadsim_mock::{
    MemoryStore, ProjectSelector, ProviderConfig, ProvisionError, RecordKind, ResourceProvider,
    SNAPMIRROR_TOTAL_TRANSFER_BYTES, Site, StaticProjectSelector, Store, VOLUME_CAPACITY,
};
use std::collections::HashSet;
use std::sync::Arc;

struct BrokenSelector;

#[async_trait]
impl ProjectSelector for BrokenSelector {
    async fn select(&self, _: &str, _: usize) -> Result<Vec<String>, ProvisionError> {
        Err(ProvisionError::Selector("permission denied".into()))
    }
}

#[tokio::test]
async fn full_lifecycle_leaves_store_empty() {
    let store = Arc::new(MemoryStore::new());
    let provider = ResourceProvider::new(
        store.clone(),
        ProviderConfig {
            consumer_project: "consumer-1".into(),
            num_tenant_projects: 3,
            pools_per_project: 2,
            volumes_per_pool: 4,
            site: Site {
                region: "europe-west4".into(),
                cluster: "cluster-07".into(),
            },
            ..ProviderConfig::default()
        },
    );
    let selector = StaticProjectSelector::new(["tp-1", "tp-2", "tp-3", "tp-4"]);

    let inventory = provider.provision(&selector).await.unwrap();

    // 1 + 3*2 pools + 3*2 svms + 3*2*4 volumes + 3*2*4 replications
    assert_eq!(inventory.len(), 61);
    assert_eq!(store.len(), 61);
    assert_eq!(store.count(RecordKind::Replication), 24);

    let entities = inventory.entities();
    assert_eq!(entities.len(), 24);

    let ids: HashSet<&str> = entities.iter().map(|e| e.id()).collect();
    assert_eq!(ids.len(), 24, "entity ids are unique");

    for entity in &entities {
        let labels = entity.labels();
        assert_eq!(labels["datacenter"], "europe-west4");
        assert_eq!(labels["cluster"], "cluster-07");
        assert_eq!(labels["project"], "consumer-1");
        assert_eq!(labels["project_id"], entity.project_id());

        let samples = entity.samples();
        assert_eq!(samples[VOLUME_CAPACITY], 1_073_741_824.0);
        assert!(
            entity
                .metric_labels(SNAPMIRROR_TOTAL_TRANSFER_BYTES)
                .contains_key("relationship_id")
        );
    }

    let report = provider.teardown(&inventory);
    assert!(report.is_clean());
    assert_eq!(report.deleted, 61);
    assert!(store.is_empty());
}

#[tokio::test]
async fn selector_failure_rolls_back_account() {
    let store = Arc::new(MemoryStore::new());
    let provider = ResourceProvider::new(store.clone(), ProviderConfig::default());

    let err = provider.provision(&BrokenSelector).await.unwrap_err();

    assert_eq!(err, ProvisionError::Selector("permission denied".into()));
    assert!(store.is_empty());
}

#[tokio::test]
async fn second_teardown_reports_every_record_missing() {
    let store = Arc::new(MemoryStore::new());
    let provider = ResourceProvider::new(store.clone(), ProviderConfig::default());
    let inventory = provider
        .provision(&StaticProjectSelector::new(["tp"]))
        .await
        .unwrap();

    assert!(provider.teardown(&inventory).is_clean());
    let again = provider.teardown(&inventory);

    assert_eq!(again.deleted, 0);
    assert_eq!(again.failed.len(), inventory.len());
}
