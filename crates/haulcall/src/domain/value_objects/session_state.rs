//! SessionState - State of one real-time voice session

use serde::{Deserialize, Serialize};

/// Observable state of a voice session
///
/// `Ended` and `Error` are terminal for a session instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Ready,
    Started,
    AgentSpeaking,
    UserTurn,
    Ended,
    Error(String),
}

impl SessionState {
    /// Microphone is held and audio flows
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Started | SessionState::AgentSpeaking | SessionState::UserTurn
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended | SessionState::Error(_))
    }

    /// Status line shown on the call screen
    pub fn label(&self) -> String {
        match self {
            SessionState::Ready => "Ready".to_string(),
            SessionState::Started => "Call started".to_string(),
            SessionState::AgentSpeaking => "Agent speaking...".to_string(),
            SessionState::UserTurn => "Your turn to speak".to_string(),
            SessionState::Ended => "Call ended".to_string(),
            SessionState::Error(message) => format!("Error: {}", message),
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}
