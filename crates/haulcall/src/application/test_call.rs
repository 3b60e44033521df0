//! Test-Call Launcher
//!
//! Creates a browser call on the backend and hands back a voice session
//! bound to it. The call id travels with the returned [`ActiveTestCall`]
//! so the results view can be opened once the session ends.

use std::sync::Arc;

use crate::application::call_service::CallService;
use crate::application::call_session::CallSession;
use crate::application::errors::ViewError;
use crate::domain::{SessionState, WebCallRequest};
use crate::ports::{CallsApi, VoiceClient};

const MISSING_FIELDS: &str = "Please fill in all fields";

/// Starts browser test calls against the backend
pub struct TestCallLauncher<A: CallsApi + ?Sized> {
    service: CallService<A>,
    voice: Arc<dyn VoiceClient>,
}

impl<A: CallsApi + ?Sized> TestCallLauncher<A> {
    pub fn new(api: Arc<A>, voice: Arc<dyn VoiceClient>) -> Self {
        Self {
            service: CallService::new(api),
            voice,
        }
    }

    pub fn is_launching(&self) -> bool {
        self.service.state().loading
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.service.state().error.as_ref()
    }

    /// Register the call and prepare its session; nothing is joined yet
    pub async fn launch(&mut self, request: &WebCallRequest) -> Result<ActiveTestCall, ViewError> {
        if request.driver_name.trim().is_empty() || request.load_number.trim().is_empty() {
            return Err(ViewError::Save(MISSING_FIELDS.to_string()));
        }

        let created = self.service.initiate_web_call(request).await?;
        Ok(ActiveTestCall {
            call_id: created.call_id,
            access_token: created.access_token,
            session: CallSession::new(Arc::clone(&self.voice)),
        })
    }
}

/// A backend call with its voice session
pub struct ActiveTestCall {
    call_id: String,
    access_token: String,
    session: CallSession,
}

impl ActiveTestCall {
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn session(&self) -> &CallSession {
        &self.session
    }

    /// Join the voice session with the token issued for this call
    pub async fn start(&mut self) -> Result<(), ViewError> {
        self.session.start(&self.access_token).await
    }

    /// Hang up from the operator side
    pub async fn hang_up(&mut self) {
        if let Err(e) = self.session.stop().await {
            tracing::warn!(call_id = %self.call_id, error = %e, "Hang up failed");
        }
    }

    /// Wait for the session to end, release it and return the call id
    ///
    /// A session that was never started is released at once and reported
    /// as `Ready`.
    pub async fn finish(self) -> (String, SessionState) {
        let outcome = match self.session.state() {
            SessionState::Ready => SessionState::Ready,
            _ => self.session.wait_for_end().await,
        };
        tracing::info!(call_id = %self.call_id, state = %outcome, "Test call finished");
        self.session.teardown().await;
        (self.call_id, outcome)
    }
}
