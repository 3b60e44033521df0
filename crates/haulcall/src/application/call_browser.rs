//! Previous-Calls Browser
//!
//! Full call list with server-side ordering and a client-side driver name
//! filter. Changing the order refetches; typing in the filter never does.

use std::sync::Arc;

use crate::application::call_service::CallService;
use crate::application::errors::ViewError;
use crate::domain::{Call, SortOrder};
use crate::ports::CallsApi;

/// Why the visible list is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The backend has no calls at all
    NoCalls,
    /// Calls exist but none match the filter; recover by clearing it
    NoMatches,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoCalls => "No previous calls found.",
            EmptyState::NoMatches => "No calls found matching your search.",
        }
    }

    /// Whether clearing the filter can help
    pub fn can_clear_filter(&self) -> bool {
        matches!(self, EmptyState::NoMatches)
    }
}

/// Browser over all stored calls
pub struct CallBrowser<A: CallsApi + ?Sized> {
    service: CallService<A>,
    calls: Vec<Call>,
    filter: String,
    order: SortOrder,
}

impl<A: CallsApi + ?Sized> CallBrowser<A> {
    /// Newest first, no filter, nothing loaded yet
    pub fn new(api: Arc<A>) -> Self {
        Self {
            service: CallService::new(api),
            calls: Vec::new(),
            filter: String::new(),
            order: SortOrder::default(),
        }
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.service.state().loading
    }

    /// Banner of the last failed load; retry with [`CallBrowser::load`]
    pub fn error(&self) -> Option<&ViewError> {
        self.service.state().error.as_ref()
    }

    /// Last fetched set, in backend order
    pub fn all(&self) -> &[Call] {
        &self.calls
    }

    /// Fetch the list in the current order
    ///
    /// A failed fetch leaves the previous list untouched.
    pub async fn load(&mut self) -> Result<usize, ViewError> {
        let calls = self.service.list_calls(self.order).await?;
        tracing::debug!(count = calls.len(), order = ?self.order, "Loaded calls");
        self.calls = calls;
        Ok(self.calls.len())
    }

    /// Change the order and refetch
    pub async fn set_order(&mut self, order: SortOrder) -> Result<usize, ViewError> {
        self.order = order;
        self.load().await
    }

    pub async fn toggle_order(&mut self) -> Result<usize, ViewError> {
        self.set_order(self.order.toggled()).await
    }

    /// Replace the driver name filter; no request is made
    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    /// Calls matching the filter, in backend order
    pub fn visible(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|call| call.matches_driver(&self.filter))
            .collect()
    }

    /// `None` while a load error is showing; the error banner takes its place
    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.error().is_some() {
            None
        } else if self.calls.is_empty() {
            Some(EmptyState::NoCalls)
        } else if self.visible().is_empty() {
            Some(EmptyState::NoMatches)
        } else {
            None
        }
    }

    /// "Showing 2 of 3 calls"
    pub fn summary(&self) -> String {
        let total = self.calls.len();
        format!(
            "Showing {} of {} call{}",
            self.visible().len(),
            total,
            if total == 1 { "" } else { "s" }
        )
    }
}
