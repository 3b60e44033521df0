//! Configuration Editor Model
//!
//! Holds the draft of one scenario's configuration apart from the last
//! saved value. Saves are explicit and whole; switching scenarios drops the
//! previous draft before the new one is requested.

use std::sync::Arc;

use crate::application::configuration_service::ConfigurationService;
use crate::application::errors::ViewError;
use crate::domain::{Configuration, ConfigurationDraft, ScenarioType};
use crate::ports::ConfigurationsApi;

/// What the configuration screen shows
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    /// No scenario selected yet
    Idle,
    /// Request for this scenario in flight; no draft is shown
    Loading(ScenarioType),
    /// Draft ready for editing
    Editing {
        draft: ConfigurationDraft,
        /// Last saved value, `None` if the scenario was never configured
        baseline: Option<Configuration>,
    },
    /// Loading failed; there is no usable draft
    LoadFailed {
        scenario_type: ScenarioType,
        error: ViewError,
    },
}

/// Editor for per-scenario configurations
pub struct ConfigurationEditor<A: ConfigurationsApi + ?Sized> {
    service: ConfigurationService<A>,
    state: EditorState,
    save_error: Option<ViewError>,
}

impl<A: ConfigurationsApi + ?Sized> ConfigurationEditor<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            service: ConfigurationService::new(api),
            state: EditorState::Idle,
            save_error: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn scenario(&self) -> Option<ScenarioType> {
        match &self.state {
            EditorState::Idle => None,
            EditorState::Loading(scenario_type) => Some(*scenario_type),
            EditorState::Editing { draft, .. } => Some(draft.scenario_type),
            EditorState::LoadFailed { scenario_type, .. } => Some(*scenario_type),
        }
    }

    pub fn draft(&self) -> Option<&ConfigurationDraft> {
        match &self.state {
            EditorState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut ConfigurationDraft> {
        match &mut self.state {
            EditorState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn baseline(&self) -> Option<&Configuration> {
        match &self.state {
            EditorState::Editing { baseline, .. } => baseline.as_ref(),
            _ => None,
        }
    }

    /// Draft differs from what is stored (always true for a new scenario)
    pub fn is_dirty(&self) -> bool {
        match &self.state {
            EditorState::Editing { draft, baseline } => baseline
                .as_ref()
                .map_or(true, |saved| ConfigurationDraft::from(saved) != *draft),
            _ => false,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.service.is_saving()
    }

    /// Success notice of the last save, cleared after a fixed delay
    pub fn save_succeeded(&self) -> bool {
        self.service.success()
    }

    /// Error of the last save; kept until the next save or scenario switch
    pub fn save_error(&self) -> Option<&ViewError> {
        self.save_error.as_ref()
    }

    /// Switch to a scenario and load its configuration
    pub async fn select_scenario(&mut self, scenario_type: ScenarioType) -> &EditorState {
        self.state = EditorState::Loading(scenario_type);
        self.save_error = None;

        self.state = match self.service.load(scenario_type).await {
            Ok(Some(configuration)) => EditorState::Editing {
                draft: ConfigurationDraft::from(&configuration),
                baseline: Some(configuration),
            },
            Ok(None) => {
                tracing::debug!(%scenario_type, "Scenario not configured, using defaults");
                EditorState::Editing {
                    draft: ConfigurationDraft::defaults(scenario_type),
                    baseline: None,
                }
            }
            Err(error) => EditorState::LoadFailed {
                scenario_type,
                error,
            },
        };
        &self.state
    }

    /// Load the current scenario again, dropping unsaved edits
    pub async fn reload(&mut self) -> Option<&EditorState> {
        let scenario_type = self.scenario()?;
        Some(self.select_scenario(scenario_type).await)
    }

    /// Send the whole draft; on success it becomes the new baseline
    pub async fn save(&mut self) -> Result<Configuration, ViewError> {
        let draft = self
            .draft()
            .cloned()
            .ok_or_else(|| ViewError::Save("Nothing to save".to_string()))?;
        self.save_error = None;

        match self.service.save(&draft).await {
            Ok(saved) => {
                self.state = EditorState::Editing {
                    draft: ConfigurationDraft::from(&saved),
                    baseline: Some(saved.clone()),
                };
                Ok(saved)
            }
            Err(error) => {
                self.save_error = Some(error.clone());
                Err(error)
            }
        }
    }
}
