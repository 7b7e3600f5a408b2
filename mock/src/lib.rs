//! loadsim-mock - Mock resource provider
//!
//! Fabricates a realistic storage control-plane hierarchy (account, pools,
//! svms, volumes, replications) for the emission engine to report on, and
//! removes it again at shutdown.
//!
//! - [`ResourceProvider`] - provisions into a [`Store`] and tears down
//! - [`ProjectSelector`] - finds the tenant projects to provision into
//! - [`Inventory`] - what one provisioning run created
//! - [`VolumeEntity`] - a volume as a [`loadsim_core::MonitoredEntity`]

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod entity;
pub mod error;
pub mod model;
pub mod provider;
pub mod selector;
pub mod store;

pub use entity::{
    SNAPMIRROR_TOTAL_TRANSFER_BYTES, Site, VOLUME_CAPACITY, VOLUME_SPACE_LOGICAL_USED,
    VolumeEntity,
};
pub use error::ProvisionError;
pub use model::{Account, Pool, Record, RecordKind, Svm, Volume, VolumeReplication};
pub use provider::{Inventory, ProviderConfig, ResourceProvider, TeardownReport};
pub use selector::{ProjectSelector, StaticProjectSelector};
pub use store::{MemoryStore, Store};
