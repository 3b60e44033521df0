//! Configuration - Per-scenario agent setup
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::value_objects::ScenarioType;

/// Shortest system prompt the backend accepts
pub const MIN_SYSTEM_PROMPT_CHARS: usize = 10;

/// Voice engine tuning parameters
///
/// Every field is required on the wire; [`RetellSettings::default`] is only
/// offered to the editor for scenarios that were never configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetellSettings {
    pub enable_backchannel: bool,
    /// 0.0 - 1.0
    pub backchannel_frequency: f64,
    /// 0.0 - 1.0
    pub interruption_sensitivity: f64,
    pub ambient_sound: Option<String>,
    /// 0.0 - 1.0
    pub ambient_sound_volume: f64,
    /// 0.0 - 2.0
    pub voice_temperature: f64,
    /// 0.5 - 2.0
    pub voice_speed: f64,
    /// 0.0 - 1.0
    pub responsiveness: f64,
    pub voice_id: String,
}

impl Default for RetellSettings {
    fn default() -> Self {
        Self {
            enable_backchannel: true,
            backchannel_frequency: 0.8,
            interruption_sensitivity: 0.7,
            ambient_sound: Some("off".to_string()),
            ambient_sound_volume: 0.3,
            voice_temperature: 1.0,
            voice_speed: 1.0,
            responsiveness: 1.0,
            voice_id: "11labs-Adrian".to_string(),
        }
    }
}

impl RetellSettings {
    /// Check every parameter against the range the voice engine accepts
    pub fn validate(&self) -> Result<(), DomainError> {
        check_range("backchannel_frequency", self.backchannel_frequency, 0.0, 1.0)?;
        check_range(
            "interruption_sensitivity",
            self.interruption_sensitivity,
            0.0,
            1.0,
        )?;
        check_range("ambient_sound_volume", self.ambient_sound_volume, 0.0, 1.0)?;
        check_range("voice_temperature", self.voice_temperature, 0.0, 2.0)?;
        check_range("voice_speed", self.voice_speed, 0.5, 2.0)?;
        check_range("responsiveness", self.responsiveness, 0.0, 1.0)?;

        if self.voice_id.trim().is_empty() {
            return Err(DomainError::Validation("voice_id must not be empty".to_string()));
        }
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), DomainError> {
    if value.is_nan() || value < min || value > max {
        return Err(DomainError::Validation(format!(
            "{} must be between {} and {} (got {})",
            field, min, max, value
        )));
    }
    Ok(())
}

/// Configuration as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub scenario_type: ScenarioType,
    pub system_prompt: String,
    pub retell_settings: RetellSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Editable configuration, also the body of `POST /api/configurations`
///
/// Always written whole; there is no partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDraft {
    pub scenario_type: ScenarioType,
    pub system_prompt: String,
    pub retell_settings: RetellSettings,
}

impl ConfigurationDraft {
    /// Draft shown when a scenario has never been configured
    pub fn defaults(scenario_type: ScenarioType) -> Self {
        Self {
            scenario_type,
            system_prompt: String::new(),
            retell_settings: RetellSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        // Counted like the backend: raw characters, whitespace included
        if self.system_prompt.chars().count() < MIN_SYSTEM_PROMPT_CHARS {
            return Err(DomainError::Validation(format!(
                "System prompt must be at least {} characters",
                MIN_SYSTEM_PROMPT_CHARS
            )));
        }
        self.retell_settings.validate()
    }
}

impl From<&Configuration> for ConfigurationDraft {
    fn from(config: &Configuration) -> Self {
        Self {
            scenario_type: config.scenario_type,
            system_prompt: config.system_prompt.clone(),
            retell_settings: config.retell_settings.clone(),
        }
    }
}

impl Configuration {
    /// Configuration holding only the editable fields of a draft
    pub fn from_draft(draft: ConfigurationDraft) -> Self {
        Self {
            id: None,
            scenario_type: draft.scenario_type,
            system_prompt: draft.system_prompt,
            retell_settings: draft.retell_settings,
            agent_id: None,
            llm_id: None,
            created_at: None,
        }
    }
}
