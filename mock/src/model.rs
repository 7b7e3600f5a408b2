//! Mock control-plane records
//!
//! Shapes follow the storage control plane's data model closely enough for
//! the monitoring pipeline to see realistic names, sizes and relations. Only
//! fields something reads (labels, samples, teardown) plus the identifying
//! descriptive ones are kept.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// 1 GiB
pub const GIB: u64 = 1 << 30;

/// 1 TiB
pub const TIB: u64 = 1 << 40;

/// Record types, in teardown order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Replication,
    Volume,
    Svm,
    Pool,
    Account,
}

impl RecordKind {
    /// Every kind, dependents before their parents
    pub const TEARDOWN_ORDER: [RecordKind; 5] = [
        RecordKind::Replication,
        RecordKind::Volume,
        RecordKind::Svm,
        RecordKind::Pool,
        RecordKind::Account,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Replication => "replication",
            RecordKind::Volume => "volume",
            RecordKind::Svm => "svm",
            RecordKind::Pool => "pool",
            RecordKind::Account => "account",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Consumer account owning everything else
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub uuid: String,
    /// The consumer project id
    pub name: String,
    pub description: String,
    pub state: String,
    pub tags: Vec<String>,
    pub volume_refresh_completed_at: DateTime<Utc>,
}

impl Account {
    pub fn mock(consumer_project: &str) -> Self {
        Self {
            uuid: new_uuid(),
            name: consumer_project.to_string(),
            description: "Account Mocked".to_string(),
            state: "ENABLED".to_string(),
            tags: vec!["tag1".to_string(), "tag2".to_string()],
            volume_refresh_completed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolAttributes {
    pub throughput_mibps: u32,
    pub iops: u32,
    pub primary_zone: String,
    pub secondary_zone: String,
    pub mediator_zone: String,
    pub is_regional_ha: bool,
    pub account_name: String,
}

/// Where a pool's storage cluster lives
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterDetails {
    pub external_name: String,
    pub ontap_version: String,
    /// Tenant project the pool's telemetry is written into
    pub regional_tenant_project: String,
    pub network: String,
    pub subnet_names: Vec<String>,
    pub intercluster_lif_ips: Vec<String>,
}

/// Storage pool inside one tenant project
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub uuid: String,
    /// `pool-<uuid>`
    pub name: String,
    pub description: String,
    pub state: String,
    pub service_level: String,
    pub size_in_bytes: u64,
    pub used_bytes: u64,
    pub network: String,
    pub account_uuid: String,
    /// `deployment-<uuid>`
    pub deployment_name: String,
    pub attributes: PoolAttributes,
    pub cluster: ClusterDetails,
}

impl Pool {
    pub fn mock(account: &Account, tenant_project: &str) -> Self {
        let uuid = new_uuid();
        Self {
            name: format!("pool-{uuid}"),
            description: "Mocked Pool".to_string(),
            state: "Ready".to_string(),
            service_level: "flex".to_string(),
            size_in_bytes: TIB,
            used_bytes: GIB,
            network: "10.0.0.0/24".to_string(),
            account_uuid: account.uuid.clone(),
            deployment_name: format!("deployment-{uuid}"),
            attributes: PoolAttributes {
                throughput_mibps: 1000,
                iops: 5000,
                primary_zone: "zone1".to_string(),
                secondary_zone: "zone2".to_string(),
                mediator_zone: "zone3".to_string(),
                is_regional_ha: false,
                account_name: account.name.clone(),
            },
            cluster: ClusterDetails {
                external_name: "cluster1".to_string(),
                ontap_version: "9.10.1".to_string(),
                regional_tenant_project: tenant_project.to_string(),
                network: "10.0.1.0/24".to_string(),
                subnet_names: vec!["subnet1".to_string(), "subnet2".to_string()],
                intercluster_lif_ips: vec!["10.0.1.10".to_string()],
            },
            uuid,
        }
    }
}

/// Virtual storage machine serving a pool's volumes
#[derive(Debug, Clone, PartialEq)]
pub struct Svm {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub state: String,
    pub account_uuid: String,
    pub pool_uuid: String,
}

impl Svm {
    pub fn mock(account: &Account, pool: &Pool) -> Self {
        Self {
            uuid: new_uuid(),
            name: "svm".to_string(),
            description: "Mocked SVM".to_string(),
            state: "Ready".to_string(),
            account_uuid: account.uuid.clone(),
            pool_uuid: pool.uuid.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeAttributes {
    pub account_name: String,
    pub deployment_name: String,
    pub is_regional_ha: bool,
}

/// Volume the engine reports on
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub uuid: String,
    /// `volume-<uuid>`
    pub name: String,
    pub description: String,
    pub state: String,
    pub health: String,
    pub mount_path: String,
    pub size_in_bytes: u64,
    pub used_bytes: u64,
    pub throughput_mibps: u32,
    pub auto_tiering_enabled: bool,
    pub account_uuid: String,
    pub pool_uuid: String,
    pub svm_uuid: String,
    pub svm_name: String,
    pub attributes: VolumeAttributes,
}

impl Volume {
    pub fn mock(account: &Account, pool: &Pool, svm: &Svm) -> Self {
        let uuid = new_uuid();
        Self {
            name: format!("volume-{uuid}"),
            description: "Mocked Volume".to_string(),
            state: "Ready".to_string(),
            health: "Healthy".to_string(),
            mount_path: "/mnt/volume".to_string(),
            size_in_bytes: GIB,
            used_bytes: 0,
            throughput_mibps: pool.attributes.throughput_mibps,
            auto_tiering_enabled: true,
            account_uuid: account.uuid.clone(),
            pool_uuid: pool.uuid.clone(),
            svm_uuid: svm.uuid.clone(),
            svm_name: svm.name.clone(),
            attributes: VolumeAttributes {
                account_name: account.name.clone(),
                deployment_name: pool.deployment_name.clone(),
                is_regional_ha: pool.attributes.is_regional_ha,
            },
            uuid,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationDetails {
    pub endpoint_type: String,
    pub replication_type: String,
    pub schedule: String,
    pub source_pool_uuid: String,
    pub source_volume_uuid: String,
    pub source_svm_name: String,
    pub source_volume_name: String,
    pub destination_pool_uuid: String,
    pub destination_volume_uuid: String,
    pub destination_svm_name: String,
    pub destination_volume_name: String,
    /// Relationship id as seen by the storage cluster
    pub external_uuid: String,
}

/// Replication relationship with a volume as its source
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeReplication {
    pub uuid: String,
    /// `replication-<uuid>`
    pub name: String,
    pub description: String,
    pub state: String,
    pub total_transfer_bytes: u64,
    pub healthy: bool,
    pub account_uuid: String,
    pub volume_uuid: String,
    pub details: ReplicationDetails,
}

impl VolumeReplication {
    pub fn mock(account: &Account, volume: &Volume) -> Self {
        let uuid = new_uuid();
        Self {
            name: format!("replication-{uuid}"),
            description: "Mocked Replication".to_string(),
            state: "Ready".to_string(),
            total_transfer_bytes: 10_000,
            healthy: true,
            account_uuid: account.uuid.clone(),
            volume_uuid: volume.uuid.clone(),
            details: ReplicationDetails {
                endpoint_type: "source".to_string(),
                replication_type: "async".to_string(),
                schedule: "daily".to_string(),
                source_pool_uuid: volume.pool_uuid.clone(),
                source_volume_uuid: volume.uuid.clone(),
                source_svm_name: volume.svm_name.clone(),
                source_volume_name: volume.name.clone(),
                destination_pool_uuid: "dest-pool-uuid".to_string(),
                destination_volume_uuid: "dest-vol-uuid".to_string(),
                destination_svm_name: "dest-svm".to_string(),
                destination_volume_name: "dest-vol".to_string(),
                external_uuid: new_uuid(),
            },
            uuid,
        }
    }
}

/// Any record the store holds
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Account(Account),
    Pool(Pool),
    Svm(Svm),
    Volume(Volume),
    Replication(VolumeReplication),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Account(_) => RecordKind::Account,
            Record::Pool(_) => RecordKind::Pool,
            Record::Svm(_) => RecordKind::Svm,
            Record::Volume(_) => RecordKind::Volume,
            Record::Replication(_) => RecordKind::Replication,
        }
    }

    pub fn uuid(&self) -> &str {
        match self {
            Record::Account(r) => &r.uuid,
            Record::Pool(r) => &r.uuid,
            Record::Svm(r) => &r.uuid,
            Record::Volume(r) => &r.uuid,
            Record::Replication(r) => &r.uuid,
        }
    }
}
