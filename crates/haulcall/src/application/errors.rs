//! View Errors
//!
//! Failures as the operator sees them. Every port error is converted
//! here, at the view model boundary; nothing propagates further.

use thiserror::Error;

use crate::domain::DomainError;
use crate::ports::VoiceClientError;

/// Error surfaced by a view model, always with a readable message
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    /// A read failed; retry by fetching again
    #[error("{0}")]
    Fetch(String),

    /// A write failed; the draft is kept
    #[error("{0}")]
    Save(String),

    /// Loading a configuration failed for a reason other than absence
    #[error("{0}")]
    ConfigLoad(String),

    /// The voice session could not start
    #[error("{0}")]
    SessionStart(String),
}

impl ViewError {
    /// Read failure, preferring the backend's own message
    pub fn fetch(err: &DomainError, fallback: &str) -> Self {
        Self::Fetch(message_for(err, fallback))
    }

    /// Write failure, preferring the backend's own message
    pub fn save(err: &DomainError, fallback: &str) -> Self {
        Self::Save(message_for(err, fallback))
    }

    pub fn config_load(fallback: &str) -> Self {
        Self::ConfigLoad(fallback.to_string())
    }

    pub fn session_start(err: &VoiceClientError) -> Self {
        Self::SessionStart(format!("Failed to start: {}", err))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Fetch(message)
            | Self::Save(message)
            | Self::ConfigLoad(message)
            | Self::SessionStart(message) => message,
        }
    }
}

fn message_for(err: &DomainError, fallback: &str) -> String {
    err.detail()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
