//! Configurations API Port
//!
//! Abstract interface for the `/api/configurations` resource group.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Configuration, ConfigurationDraft, ScenarioType};

/// Backend interface for per-scenario configurations
#[async_trait]
pub trait ConfigurationsApi: Send + Sync {
    /// Find the configuration of a scenario
    ///
    /// `Ok(None)` means the scenario was never configured.
    async fn get_configuration(
        &self,
        scenario_type: ScenarioType,
    ) -> Result<Option<Configuration>, DomainError>;

    /// Create or replace the configuration of `draft.scenario_type`
    async fn save_configuration(
        &self,
        draft: &ConfigurationDraft,
    ) -> Result<Configuration, DomainError>;

    /// All stored configurations
    async fn list_configurations(&self) -> Result<Vec<Configuration>, DomainError>;
}
