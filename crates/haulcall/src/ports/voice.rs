//! Voice Client Port
//!
//! Abstract interface over the vendor real-time voice SDK.
//! The rest of the crate only sees this narrow command/event surface,
//! never the vendor's object shape or event names.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Event emitted by the vendor session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    CallStarted,
    CallEnded,
    AgentStartTalking,
    AgentStopTalking,
    Error(String),
}

/// Failure of a vendor command
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoiceClientError {
    #[error("microphone access denied")]
    PermissionDenied,

    #[error("access token rejected: {0}")]
    InvalidToken(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Real-time voice client (one vendor session object)
///
/// # Example
///
/// ```rust,ignore
/// use haulcall::ports::VoiceClient;
///
/// struct WebRtcVoice { /* vendor handle */ }
///
/// #[async_trait]
/// impl VoiceClient for WebRtcVoice {
///     async fn start_call(&self, access_token: &str) -> Result<(), VoiceClientError> {
///         // Acquire the microphone and join the room
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait VoiceClient: Send + Sync {
    /// Acquire the microphone and join the session behind `access_token`
    async fn start_call(&self, access_token: &str) -> Result<(), VoiceClientError>;

    /// Leave the session and release the microphone
    ///
    /// Must tolerate being called when no session is running.
    async fn stop_call(&self) -> Result<(), VoiceClientError>;

    /// Subscribe to session events
    fn subscribe(&self) -> broadcast::Receiver<VoiceEvent>;
}
