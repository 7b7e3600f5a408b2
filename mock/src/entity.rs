//! Volumes as monitored entities

use crate::model::{Account, Pool, Volume, VolumeReplication};
use loadsim_core::{Labels, MonitoredEntity, Readings};

/// Logical bytes used by the volume
pub const VOLUME_SPACE_LOGICAL_USED: &str = "volume_space_logical_used";

/// Provisioned volume size in bytes
pub const VOLUME_CAPACITY: &str = "volume_capacity";

/// Bytes transferred by the volume's replication
pub const SNAPMIRROR_TOTAL_TRANSFER_BYTES: &str = "snapmirror_total_transfer_bytes";

/// Where the simulated storage runs; attached to every sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub region: String,
    pub cluster: String,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            region: "australia-southeast1".to_string(),
            cluster: "cluster-01".to_string(),
        }
    }
}

/// A volume, plus its replication if it has one
///
/// Counters are copied out of the records at construction, so reading
/// samples never touches the store.
#[derive(Debug, Clone)]
pub struct VolumeEntity {
    name: String,
    project_id: String,
    labels: Labels,
    used_bytes: u64,
    size_in_bytes: u64,
    replication: Option<ReplicationCounters>,
}

#[derive(Debug, Clone)]
struct ReplicationCounters {
    relationship_id: String,
    total_transfer_bytes: u64,
}

impl VolumeEntity {
    pub fn new(
        volume: &Volume,
        pool: &Pool,
        account: &Account,
        replication: Option<&VolumeReplication>,
        site: &Site,
    ) -> Self {
        let project_id = pool.cluster.regional_tenant_project.clone();
        let labels = Labels::from([
            ("volume".to_string(), volume.name.clone()),
            ("datacenter".to_string(), site.region.clone()),
            ("cluster".to_string(), site.cluster.clone()),
            ("project_id".to_string(), project_id.clone()),
            ("deployment_name".to_string(), pool.deployment_name.clone()),
            ("project".to_string(), account.name.clone()),
        ]);

        Self {
            name: volume.name.clone(),
            project_id,
            labels,
            used_bytes: volume.used_bytes,
            size_in_bytes: volume.size_in_bytes,
            replication: replication.map(|r| ReplicationCounters {
                relationship_id: r.details.external_uuid.clone(),
                total_transfer_bytes: r.total_transfer_bytes,
            }),
        }
    }
}

impl MonitoredEntity for VolumeEntity {
    fn id(&self) -> &str {
        &self.name
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn metric_labels(&self, metric: &str) -> Labels {
        match (&self.replication, metric) {
            (Some(r), SNAPMIRROR_TOTAL_TRANSFER_BYTES) => Labels::from([(
                "relationship_id".to_string(),
                r.relationship_id.clone(),
            )]),
            _ => Labels::new(),
        }
    }

    fn samples(&self) -> Readings {
        let transfer = self
            .replication
            .as_ref()
            .map(|r| r.total_transfer_bytes)
            .unwrap_or(0);

        Readings::from([
            (VOLUME_SPACE_LOGICAL_USED.to_string(), self.used_bytes as f64),
            (VOLUME_CAPACITY.to_string(), self.size_in_bytes as f64),
            (SNAPMIRROR_TOTAL_TRANSFER_BYTES.to_string(), transfer as f64),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Svm;

    fn records() -> (Account, Pool, Volume, VolumeReplication) {
        let account = Account::mock("vsa-billing-09");
        let pool = Pool::mock(&account, "z257c6412e15fa257-tp");
        let svm = Svm::mock(&account, &pool);
        let volume = Volume::mock(&account, &pool, &svm);
        let replication = VolumeReplication::mock(&account, &volume);
        (account, pool, volume, replication)
    }

    #[test]
    fn test_labels() {
        let (account, pool, volume, replication) = records();
        let entity = VolumeEntity::new(&volume, &pool, &account, Some(&replication), &Site::default());

        let labels = entity.labels();
        assert_eq!(labels.get("volume").unwrap(), &volume.name);
        assert_eq!(labels.get("datacenter").unwrap(), "australia-southeast1");
        assert_eq!(labels.get("cluster").unwrap(), "cluster-01");
        assert_eq!(labels.get("project_id").unwrap(), "z257c6412e15fa257-tp");
        assert_eq!(labels.get("deployment_name").unwrap(), &pool.deployment_name);
        assert_eq!(labels.get("project").unwrap(), "vsa-billing-09");
        assert_eq!(labels.len(), 6);
        assert_eq!(entity.project_id(), "z257c6412e15fa257-tp");
        assert_eq!(entity.id(), volume.name);
    }

    #[test]
    fn test_samples() {
        let (account, pool, volume, replication) = records();
        let entity = VolumeEntity::new(&volume, &pool, &account, Some(&replication), &Site::default());

        let samples = entity.samples();
        assert_eq!(samples[VOLUME_SPACE_LOGICAL_USED], 0.0);
        assert_eq!(samples[VOLUME_CAPACITY], 1_073_741_824.0);
        assert_eq!(samples[SNAPMIRROR_TOTAL_TRANSFER_BYTES], 10_000.0);
    }

    #[test]
    fn test_relationship_id_only_on_transfer_bytes() {
        let (account, pool, volume, replication) = records();
        let entity = VolumeEntity::new(&volume, &pool, &account, Some(&replication), &Site::default());

        assert_eq!(
            entity
                .metric_labels(SNAPMIRROR_TOTAL_TRANSFER_BYTES)
                .get("relationship_id")
                .unwrap(),
            &replication.details.external_uuid
        );
        assert!(entity.metric_labels(VOLUME_CAPACITY).is_empty());
        assert!(entity.metric_labels(VOLUME_SPACE_LOGICAL_USED).is_empty());
    }

    #[test]
    fn test_missing_replication_reports_zero_transfer() {
        let (account, pool, volume, _) = records();
        let entity = VolumeEntity::new(&volume, &pool, &account, None, &Site::default());

        assert_eq!(entity.samples()[SNAPMIRROR_TOTAL_TRANSFER_BYTES], 0.0);
        assert!(entity.metric_labels(SNAPMIRROR_TOTAL_TRANSFER_BYTES).is_empty());
    }
}
