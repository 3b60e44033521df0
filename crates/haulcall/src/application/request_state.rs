//! Request State
//!
//! Loading and error flags shared by the data services.

use crate::application::errors::ViewError;

/// Progress of the most recent request of a service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub loading: bool,
    pub error: Option<ViewError>,
}

impl RequestState {
    /// Mark a request as started, clearing the previous error
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Record the outcome and hand it back
    pub fn finish<T>(&mut self, result: Result<T, ViewError>) -> Result<T, ViewError> {
        self.loading = false;
        if let Err(err) = &result {
            self.error = Some(err.clone());
        }
        result
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
