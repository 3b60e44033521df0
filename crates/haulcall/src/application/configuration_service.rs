//! Configuration Application Service (Use Case)
//!
//! Loads and saves per-scenario configurations and owns the
//! loading/saving/error/success flags of the configuration screen.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::application::errors::ViewError;
use crate::application::request_state::RequestState;
use crate::domain::{Configuration, ConfigurationDraft, ScenarioType};
use crate::ports::ConfigurationsApi;

/// How long the "saved" notice stays visible
pub const SAVE_NOTICE_DURATION: Duration = Duration::from_millis(3000);

const LOAD_FAILED: &str = "Failed to load configuration";
const SAVE_FAILED: &str = "Failed to save configuration";
const LIST_FAILED: &str = "Failed to list configurations";

/// Application service for configuration operations
pub struct ConfigurationService<A: ConfigurationsApi + ?Sized> {
    api: Arc<A>,
    configuration: Option<Configuration>,
    state: RequestState,
    saving: bool,
    saved_until: Option<Instant>,
}

impl<A: ConfigurationsApi + ?Sized> ConfigurationService<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            configuration: None,
            state: RequestState::default(),
            saving: false,
            saved_until: None,
        }
    }

    /// Last configuration loaded or saved
    pub fn configuration(&self) -> Option<&Configuration> {
        self.configuration.as_ref()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Whether the success notice of the last save is still showing
    pub fn success(&self) -> bool {
        self.saved_until
            .is_some_and(|until| Instant::now() < until)
    }

    pub fn clear_error(&mut self) {
        self.state.clear_error();
    }

    /// Load the configuration of a scenario
    ///
    /// `Ok(None)` when the scenario has never been configured.
    pub async fn load(
        &mut self,
        scenario_type: ScenarioType,
    ) -> Result<Option<Configuration>, ViewError> {
        self.state.begin();
        self.saved_until = None;

        let result = match self.api.get_configuration(scenario_type).await {
            Ok(configuration) => Ok(configuration),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => {
                tracing::warn!(%scenario_type, error = %e, "Failed to load configuration");
                Err(ViewError::config_load(LOAD_FAILED))
            }
        };

        if let Ok(configuration) = &result {
            self.configuration = configuration.clone();
        }
        self.state.finish(result)
    }

    /// Validate and write a complete configuration
    pub async fn save(&mut self, draft: &ConfigurationDraft) -> Result<Configuration, ViewError> {
        self.state.begin();
        self.saved_until = None;

        if let Err(e) = draft.validate() {
            return self.state.finish(Err(ViewError::save(&e, SAVE_FAILED)));
        }

        self.saving = true;
        let result = self
            .api
            .save_configuration(draft)
            .await
            .map_err(|e| ViewError::save(&e, SAVE_FAILED));
        self.saving = false;

        if let Ok(saved) = &result {
            tracing::info!(scenario_type = %saved.scenario_type, "Configuration saved");
            self.configuration = Some(saved.clone());
            self.saved_until = Some(Instant::now() + SAVE_NOTICE_DURATION);
        }
        self.state.finish(result)
    }

    /// All stored configurations
    pub async fn list_all(&mut self) -> Result<Vec<Configuration>, ViewError> {
        self.state.begin();
        let result = self
            .api
            .list_configurations()
            .await
            .map_err(|e| ViewError::fetch(&e, LIST_FAILED));
        self.state.finish(result)
    }
}
