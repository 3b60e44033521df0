//! Calls API Port
//!
//! Abstract interface for the `/api/calls` resource group.

use async_trait::async_trait;

use crate::domain::{
    errors::DomainError, Call, PhoneCallInitiated, PhoneCallRequest, SortOrder,
    WebCallInitiated, WebCallRequest,
};

/// Backend interface for call records
#[async_trait]
pub trait CallsApi: Send + Sync {
    /// Create a browser call and obtain its one-time session credential
    async fn initiate_web_call(
        &self,
        request: &WebCallRequest,
    ) -> Result<WebCallInitiated, DomainError>;

    /// Create a call that dials the driver's phone
    async fn initiate_phone_call(
        &self,
        request: &PhoneCallRequest,
    ) -> Result<PhoneCallInitiated, DomainError>;

    /// Fetch the full record of one call
    async fn get_call(&self, call_id: &str) -> Result<Call, DomainError>;

    /// List all calls ordered by creation time
    async fn list_calls(&self, order: SortOrder) -> Result<Vec<Call>, DomainError>;
}
