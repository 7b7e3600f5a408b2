//! Tenant project discovery

use crate::error::ProvisionError;
use async_trait::async_trait;
use tracing::info;

/// Finds the tenant projects resources are provisioned into
#[async_trait]
pub trait ProjectSelector: Send + Sync {
    /// Up to `max` eligible projects under `parent_folder` (0 = no limit)
    ///
    /// An empty result is not an error here; the provider decides.
    async fn select(&self, parent_folder: &str, max: usize) -> Result<Vec<String>, ProvisionError>;
}

/// Selector answering from a fixed list
pub struct StaticProjectSelector {
    projects: Vec<String>,
}

impl StaticProjectSelector {
    pub fn new<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projects: projects.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ProjectSelector for StaticProjectSelector {
    async fn select(&self, parent_folder: &str, max: usize) -> Result<Vec<String>, ProvisionError> {
        let limit = if max == 0 { usize::MAX } else { max };
        let selected: Vec<String> = self.projects.iter().take(limit).cloned().collect();

        for project in &selected {
            info!(project = %project, parent_folder = %parent_folder, "active tenant project");
        }
        info!(count = selected.len(), "tenant projects selected");

        Ok(selected)
    }
}
