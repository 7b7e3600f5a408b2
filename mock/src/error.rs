//! Error types for provisioning

use crate::model::RecordKind;
use thiserror::Error;

/// Errors from the store, the project selector or provisioning itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// The selector found nothing to provision into
    #[error("no active tenant projects found under folder {parent_folder}")]
    NoTenantProjects { parent_folder: String },

    /// Project discovery failed
    #[error("tenant project discovery failed: {0}")]
    Selector(String),

    /// A record with this identity already exists
    #[error("{kind} {uuid} already exists")]
    Duplicate { kind: RecordKind, uuid: String },

    /// No record with this identity
    #[error("{kind} {uuid} not found")]
    NotFound { kind: RecordKind, uuid: String },

    /// Backend failure
    #[error("store error: {0}")]
    Store(String),
}
