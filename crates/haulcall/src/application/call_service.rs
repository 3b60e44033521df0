//! Call Application Service (Use Case)
//!
//! Orchestrates backend calls for call records and owns their
//! loading/error flags.

use std::sync::Arc;

use crate::application::errors::ViewError;
use crate::application::request_state::RequestState;
use crate::domain::{
    Call, PhoneCallInitiated, PhoneCallRequest, SortOrder, WebCallInitiated, WebCallRequest,
};
use crate::ports::CallsApi;

const INITIATE_FAILED: &str = "Failed to initiate call";
const FETCH_FAILED: &str = "Failed to fetch call";
const LIST_FAILED: &str = "Failed to load previous calls. Please try again.";

/// Application service for call operations
pub struct CallService<A: CallsApi + ?Sized> {
    api: Arc<A>,
    state: RequestState,
}

impl<A: CallsApi + ?Sized> CallService<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RequestState::default(),
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn clear_error(&mut self) {
        self.state.clear_error();
    }

    /// Create a browser call
    pub async fn initiate_web_call(
        &mut self,
        request: &WebCallRequest,
    ) -> Result<WebCallInitiated, ViewError> {
        self.state.begin();
        let result = self
            .api
            .initiate_web_call(request)
            .await
            .map_err(|e| ViewError::save(&e, INITIATE_FAILED));

        if let Ok(created) = &result {
            tracing::info!(call_id = %created.call_id, "Web call initiated");
        }
        self.state.finish(result)
    }

    /// Create a call to the driver's phone
    pub async fn initiate_phone_call(
        &mut self,
        request: &PhoneCallRequest,
    ) -> Result<PhoneCallInitiated, ViewError> {
        self.state.begin();
        let result = self
            .api
            .initiate_phone_call(request)
            .await
            .map_err(|e| ViewError::save(&e, INITIATE_FAILED));

        if let Ok(created) = &result {
            tracing::info!(call_id = %created.call_id, "Phone call initiated");
        }
        self.state.finish(result)
    }

    /// Get a call by ID
    pub async fn get_call(&mut self, call_id: &str) -> Result<Call, ViewError> {
        self.state.begin();
        let result = self
            .api
            .get_call(call_id)
            .await
            .map_err(|e| ViewError::fetch(&e, FETCH_FAILED));
        self.state.finish(result)
    }

    /// List all calls in the given order
    pub async fn list_calls(&mut self, order: SortOrder) -> Result<Vec<Call>, ViewError> {
        self.state.begin();
        let result = self
            .api
            .list_calls(order)
            .await
            .map_err(|e| ViewError::fetch(&e, LIST_FAILED));
        self.state.finish(result)
    }
}
