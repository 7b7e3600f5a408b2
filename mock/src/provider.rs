//! Provisioning and teardown of the mock resource hierarchy
//!
//! ```text
//! Account
//!   └─ per tenant project × pools_per_project
//!        Pool ── Svm
//!          └─ per volumes_per_pool
//!               Volume ── VolumeReplication
//! ```

use crate::entity::{Site, VolumeEntity};
use crate::error::ProvisionError;
use crate::model::{Account, Pool, Record, RecordKind, Svm, Volume, VolumeReplication};
use crate::selector::ProjectSelector;
use crate::store::Store;
use loadsim_core::MonitoredEntity;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, warn};

/// What to provision
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Becomes the account name
    pub consumer_project: String,
    /// Folder the selector searches
    pub parent_folder: String,
    pub num_tenant_projects: usize,
    pub pools_per_project: usize,
    pub volumes_per_pool: usize,
    pub site: Site,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            consumer_project: "vsa-billing-09".to_string(),
            parent_folder: "1025659400543".to_string(),
            num_tenant_projects: 1,
            pools_per_project: 2,
            volumes_per_pool: 3,
            site: Site::default(),
        }
    }
}

/// Everything one provisioning run created
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub accounts: Vec<Account>,
    pub pools: Vec<Pool>,
    pub svms: Vec<Svm>,
    pub volumes: Vec<Volume>,
    pub replications: Vec<VolumeReplication>,
    pub site: Site,
}

impl Inventory {
    /// One monitored entity per volume, paired with its replication
    pub fn entities(&self) -> Vec<Arc<dyn MonitoredEntity>> {
        let pools: HashMap<&str, &Pool> = self.pools.iter().map(|p| (p.uuid.as_str(), p)).collect();
        let accounts: HashMap<&str, &Account> =
            self.accounts.iter().map(|a| (a.uuid.as_str(), a)).collect();
        let replications: HashMap<&str, &VolumeReplication> = self
            .replications
            .iter()
            .map(|r| (r.volume_uuid.as_str(), r))
            .collect();

        self.volumes
            .iter()
            .filter_map(|volume| {
                let Some(pool) = pools.get(volume.pool_uuid.as_str()) else {
                    warn!(volume = %volume.name, "volume without pool, not monitored");
                    return None;
                };
                let Some(account) = accounts.get(volume.account_uuid.as_str()) else {
                    warn!(volume = %volume.name, "volume without account, not monitored");
                    return None;
                };
                let replication = replications.get(volume.uuid.as_str()).copied();

                let entity = VolumeEntity::new(volume, pool, account, replication, &self.site);
                Some(Arc::new(entity) as Arc<dyn MonitoredEntity>)
            })
            .collect()
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.accounts.len()
            + self.pools.len()
            + self.svms.len()
            + self.volumes.len()
            + self.replications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record identities of one kind, without duplicates, in creation order
    fn identities(&self, kind: RecordKind) -> Vec<&str> {
        let uuids: Vec<&str> = match kind {
            RecordKind::Replication => self.replications.iter().map(|r| r.uuid.as_str()).collect(),
            RecordKind::Volume => self.volumes.iter().map(|r| r.uuid.as_str()).collect(),
            RecordKind::Svm => self.svms.iter().map(|r| r.uuid.as_str()).collect(),
            RecordKind::Pool => self.pools.iter().map(|r| r.uuid.as_str()).collect(),
            RecordKind::Account => self.accounts.iter().map(|r| r.uuid.as_str()).collect(),
        };
        let mut seen = HashSet::new();
        uuids.into_iter().filter(|uuid| seen.insert(*uuid)).collect()
    }
}

/// Outcome of a teardown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Records deleted
    pub deleted: usize,
    /// Records that could not be deleted
    pub failed: Vec<(RecordKind, String)>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Creates the mock hierarchy in a store and removes it again
pub struct ResourceProvider {
    store: Arc<dyn Store>,
    config: ProviderConfig,
}

impl ResourceProvider {
    pub fn new(store: Arc<dyn Store>, config: ProviderConfig) -> Self {
        Self { store, config }
    }

    /// Create one account and the pool/svm/volume/replication tree below it
    ///
    /// Fails if the selector errors or finds no tenant project, or if the
    /// store rejects a record. On a store failure, whatever was created so
    /// far is torn down before returning the error.
    pub async fn provision(
        &self,
        selector: &dyn ProjectSelector,
    ) -> Result<Inventory, ProvisionError> {
        let mut inventory = Inventory {
            site: self.config.site.clone(),
            ..Inventory::default()
        };

        match self.provision_into(selector, &mut inventory).await {
            Ok(()) => {
                info!(
                    accounts = inventory.accounts.len(),
                    pools = inventory.pools.len(),
                    svms = inventory.svms.len(),
                    volumes = inventory.volumes.len(),
                    replications = inventory.replications.len(),
                    "Resources setup completed"
                );
                Ok(inventory)
            }
            Err(e) => {
                error!(error = %e, created = inventory.len(), "provisioning failed");
                if !inventory.is_empty() {
                    self.teardown(&inventory);
                }
                Err(e)
            }
        }
    }

    async fn provision_into(
        &self,
        selector: &dyn ProjectSelector,
        inventory: &mut Inventory,
    ) -> Result<(), ProvisionError> {
        let cfg = &self.config;

        let account = Account::mock(&cfg.consumer_project);
        self.store.create(Record::Account(account.clone()))?;
        inventory.accounts.push(account.clone());

        let projects = selector
            .select(&cfg.parent_folder, cfg.num_tenant_projects)
            .await?;
        if projects.is_empty() {
            return Err(ProvisionError::NoTenantProjects {
                parent_folder: cfg.parent_folder.clone(),
            });
        }
        if projects.len() < cfg.num_tenant_projects {
            warn!(
                requested = cfg.num_tenant_projects,
                found = projects.len(),
                "fewer tenant projects than requested"
            );
        }

        for project in &projects {
            for _ in 0..cfg.pools_per_project {
                let pool = Pool::mock(&account, project);
                self.store.create(Record::Pool(pool.clone()))?;
                inventory.pools.push(pool.clone());

                let svm = Svm::mock(&account, &pool);
                self.store.create(Record::Svm(svm.clone()))?;
                inventory.svms.push(svm.clone());

                for _ in 0..cfg.volumes_per_pool {
                    let volume = Volume::mock(&account, &pool, &svm);
                    self.store.create(Record::Volume(volume.clone()))?;
                    inventory.volumes.push(volume.clone());

                    let replication = VolumeReplication::mock(&account, &volume);
                    self.store.create(Record::Replication(replication.clone()))?;
                    inventory.replications.push(replication);
                }
            }
        }

        Ok(())
    }

    /// Delete every record in `inventory`, dependents first
    ///
    /// Best effort: each failure is logged and reported, never retried, and
    /// never stops the remaining deletions.
    pub fn teardown(&self, inventory: &Inventory) -> TeardownReport {
        info!(records = inventory.len(), "cleaning up created resources");
        let mut report = TeardownReport::default();

        for kind in RecordKind::TEARDOWN_ORDER {
            for uuid in inventory.identities(kind) {
                match self.store.delete(kind, uuid) {
                    Ok(()) => report.deleted += 1,
                    Err(e) => {
                        error!(kind = %kind, uuid = %uuid, error = %e, "failed to delete record");
                        report.failed.push((kind, uuid.to_string()));
                    }
                }
            }
        }

        info!(
            deleted = report.deleted,
            failed = report.failed.len(),
            "resource cleanup finished"
        );
        report
    }
}
