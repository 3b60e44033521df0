//! Call Session Adapter
//!
//! Wraps one vendor voice session behind a small state enum and two
//! commands. Vendor events are pumped into a `watch` channel so there is
//! exactly one current [`SessionState`] at any time.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::application::errors::ViewError;
use crate::domain::SessionState;
use crate::ports::{VoiceClient, VoiceClientError, VoiceEvent};

/// State reached from `current` when `event` arrives, if any
pub fn next_state(current: &SessionState, event: &VoiceEvent) -> Option<SessionState> {
    if current.is_terminal() {
        return None;
    }
    match event {
        VoiceEvent::CallStarted => {
            matches!(current, SessionState::Ready).then_some(SessionState::Started)
        }
        VoiceEvent::AgentStartTalking => current.is_active().then_some(SessionState::AgentSpeaking),
        VoiceEvent::AgentStopTalking => current.is_active().then_some(SessionState::UserTurn),
        VoiceEvent::CallEnded => current.is_active().then_some(SessionState::Ended),
        VoiceEvent::Error(message) => Some(SessionState::Error(message.clone())),
    }
}

fn apply(state: &watch::Sender<SessionState>, event: &VoiceEvent) {
    state.send_if_modified(|current| match next_state(current, event) {
        Some(next) if next != *current => {
            tracing::debug!(from = %current, to = %next, "Voice session transition");
            *current = next;
            true
        }
        _ => false,
    });
}

async fn pump_events(
    mut events: broadcast::Receiver<VoiceEvent>,
    state: Arc<watch::Sender<SessionState>>,
) {
    loop {
        match events.recv().await {
            Ok(event) => apply(&state, &event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Voice session events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// One real-time voice session
///
/// Call [`CallSession::teardown`] when the owning screen goes away. A
/// session dropped without teardown still stops the vendor client on the
/// current runtime.
pub struct CallSession {
    client: Arc<dyn VoiceClient>,
    state: Arc<watch::Sender<SessionState>>,
    pump: JoinHandle<()>,
    torn_down: bool,
}

impl CallSession {
    /// Wrap a vendor client; the session starts in `Ready`
    pub fn new(client: Arc<dyn VoiceClient>) -> Self {
        let (sender, _) = watch::channel(SessionState::Ready);
        let state = Arc::new(sender);
        let pump = tokio::spawn(pump_events(client.subscribe(), Arc::clone(&state)));

        Self {
            client,
            state,
            pump,
            torn_down: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Follow state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_call_active(&self) -> bool {
        self.state.borrow().is_active()
    }

    pub fn status_label(&self) -> String {
        self.state.borrow().label()
    }

    /// Join the session behind `access_token`
    ///
    /// Only allowed from `Ready`; a finished session must be [`reset`] first.
    ///
    /// [`reset`]: CallSession::reset
    pub async fn start(&mut self, access_token: &str) -> Result<(), ViewError> {
        let current = self.state();
        if current.is_active() {
            return Err(ViewError::SessionStart(
                "A call is already active".to_string(),
            ));
        }
        if current.is_terminal() {
            return Err(ViewError::SessionStart(
                "Session has finished; reset it before starting a new call".to_string(),
            ));
        }

        match self.client.start_call(access_token).await {
            Ok(()) => {
                apply(&self.state, &VoiceEvent::CallStarted);
                tracing::info!("Voice session started");
                Ok(())
            }
            Err(e) => {
                let err = ViewError::session_start(&e);
                tracing::warn!(error = %e, "Failed to start voice session");
                self.state
                    .send_replace(SessionState::Error(err.message().to_string()));
                Err(err)
            }
        }
    }

    /// Leave the session; a no-op when nothing is running
    pub async fn stop(&mut self) -> Result<(), VoiceClientError> {
        let active = self.is_call_active();

        match self.client.stop_call().await {
            Ok(()) => {
                if active {
                    apply(&self.state, &VoiceEvent::CallEnded);
                    tracing::info!("Voice session stopped");
                }
                Ok(())
            }
            Err(e) if active => {
                tracing::warn!(error = %e, "Failed to stop voice session");
                apply(&self.state, &VoiceEvent::Error(e.to_string()));
                Err(e)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Stop without active session");
                Ok(())
            }
        }
    }

    /// Return a finished session to `Ready`; refused while a call is active
    ///
    /// Events the vendor queued for the previous call are dropped.
    pub fn reset(&mut self) -> bool {
        if self.is_call_active() {
            return false;
        }
        self.pump.abort();
        self.pump = tokio::spawn(pump_events(
            self.client.subscribe(),
            Arc::clone(&self.state),
        ));
        self.state.send_replace(SessionState::Ready);
        true
    }

    /// Wait until the session is `Ended` or `Error`
    pub async fn wait_for_end(&self) -> SessionState {
        let mut receiver = self.state.subscribe();
        let reached = receiver
            .wait_for(SessionState::is_terminal)
            .await
            .map(|state| (*state).clone());
        reached.unwrap_or_else(|_| self.state())
    }

    /// Mandatory cleanup: stop unconditionally and release the event pump
    pub async fn teardown(mut self) {
        self.torn_down = true;
        if let Err(e) = self.stop().await {
            tracing::warn!(error = %e, "Voice session did not stop cleanly");
        }
        self.pump.abort();
    }
}

impl Drop for CallSession {
    fn drop(&mut self) {
        self.pump.abort();
        if self.torn_down {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let client = Arc::clone(&self.client);
                handle.spawn(async move {
                    if let Err(e) = client.stop_call().await {
                        tracing::debug!(error = %e, "Stop on drop failed");
                    }
                });
            }
            Err(_) => tracing::warn!("Voice session dropped outside a runtime; not stopped"),
        }
    }
}
