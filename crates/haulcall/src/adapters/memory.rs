//! In-Memory Backend Adapter
//!
//! Process-local implementation of the calls and configurations ports.
//! Mirrors the backend's rules (agent must be configured before a call,
//! status only moves forward) so view models can run without a server.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    errors::DomainError, Call, CallStatus, Configuration, ConfigurationDraft, FieldValue,
    PhoneCallInitiated, PhoneCallRequest, ScenarioType, SortOrder, WebCallInitiated,
    WebCallRequest, WEB_CALL_PHONE_MARKER,
};
use crate::ports::{CallsApi, ConfigurationsApi};

/// In-process backend store
#[derive(Default)]
pub struct InMemoryBackend {
    calls: RwLock<Vec<Call>>,
    configurations: RwLock<BTreeMap<ScenarioType, Configuration>>,
    call_fetches: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a call record as-is
    pub async fn insert_call(&self, call: Call) {
        self.calls.write().await.push(call);
    }

    /// Apply a server-side status change, as the webhook processor would
    pub async fn advance_call(
        &self,
        call_id: &str,
        status: CallStatus,
        transcript: Option<String>,
        structured_data: Option<BTreeMap<String, FieldValue>>,
    ) -> Result<Call, DomainError> {
        let mut calls = self.calls.write().await;
        let call = calls
            .iter_mut()
            .find(|call| call.id == call_id)
            .ok_or_else(|| DomainError::not_found("Call", call_id))?;

        if !call.call_status.can_transition_to(status) {
            return Err(DomainError::Validation(format!(
                "Call {} cannot move from {} to {}",
                call_id, call.call_status, status
            )));
        }

        call.call_status = status;
        // Results are written once and never replaced
        if call.raw_transcript.is_none() {
            call.raw_transcript = transcript;
        }
        if call.structured_data.is_none() {
            call.structured_data = structured_data;
        }
        Ok(call.clone())
    }

    /// Number of `get_call` requests served so far
    pub fn call_fetches(&self) -> usize {
        self.call_fetches.load(Ordering::SeqCst)
    }

    async fn ensure_configured(&self, scenario_type: ScenarioType) -> Result<(), DomainError> {
        if self.configurations.read().await.contains_key(&scenario_type) {
            return Ok(());
        }
        Err(DomainError::Api {
            status: 400,
            detail: Some(format!("No agent configured for scenario: {}", scenario_type)),
        })
    }

    async fn create_call(
        &self,
        driver_name: &str,
        driver_phone: &str,
        load_number: &str,
        scenario_type: ScenarioType,
    ) -> Call {
        let call = Call {
            id: Uuid::new_v4().to_string(),
            driver_name: driver_name.to_string(),
            driver_phone: Some(driver_phone.to_string()),
            load_number: load_number.to_string(),
            scenario_type,
            call_status: CallStatus::Initiated,
            retell_call_id: Some(format!("call_{}", Uuid::new_v4().simple())),
            raw_transcript: None,
            structured_data: None,
            created_at: Utc::now(),
        };
        self.calls.write().await.push(call.clone());

        tracing::info!(call_id = %call.id, %scenario_type, "Created call");
        call
    }
}

fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[async_trait]
impl CallsApi for InMemoryBackend {
    async fn initiate_web_call(
        &self,
        request: &WebCallRequest,
    ) -> Result<WebCallInitiated, DomainError> {
        self.ensure_configured(request.scenario_type).await?;

        let call = self
            .create_call(
                &request.driver_name,
                WEB_CALL_PHONE_MARKER,
                &request.load_number,
                request.scenario_type,
            )
            .await;

        Ok(WebCallInitiated {
            call_id: call.id,
            access_token: Uuid::new_v4().to_string(),
            retell_call_id: call.retell_call_id,
        })
    }

    async fn initiate_phone_call(
        &self,
        request: &PhoneCallRequest,
    ) -> Result<PhoneCallInitiated, DomainError> {
        if !is_valid_phone(&request.driver_phone) {
            return Err(DomainError::Validation(format!(
                "Invalid phone number: {}",
                request.driver_phone
            )));
        }
        self.ensure_configured(request.scenario_type).await?;

        let call = self
            .create_call(
                &request.driver_name,
                &request.driver_phone,
                &request.load_number,
                request.scenario_type,
            )
            .await;

        Ok(PhoneCallInitiated {
            call_id: call.id,
            retell_call_id: call.retell_call_id,
            status: Some(call.call_status),
        })
    }

    async fn get_call(&self, call_id: &str) -> Result<Call, DomainError> {
        self.call_fetches.fetch_add(1, Ordering::SeqCst);
        self.calls
            .read()
            .await
            .iter()
            .find(|call| call.id == call_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Call", call_id))
    }

    async fn list_calls(&self, order: SortOrder) -> Result<Vec<Call>, DomainError> {
        let mut calls = self.calls.read().await.clone();
        calls.sort_by(|a, b| match order {
            SortOrder::Ascending => a.created_at.cmp(&b.created_at),
            SortOrder::Descending => b.created_at.cmp(&a.created_at),
        });
        Ok(calls)
    }
}

#[async_trait]
impl ConfigurationsApi for InMemoryBackend {
    async fn get_configuration(
        &self,
        scenario_type: ScenarioType,
    ) -> Result<Option<Configuration>, DomainError> {
        Ok(self.configurations.read().await.get(&scenario_type).cloned())
    }

    async fn save_configuration(
        &self,
        draft: &ConfigurationDraft,
    ) -> Result<Configuration, DomainError> {
        let mut configurations = self.configurations.write().await;
        let previous = configurations.get(&draft.scenario_type);

        let saved = Configuration {
            id: previous
                .and_then(|c| c.id.clone())
                .or_else(|| Some(Uuid::new_v4().to_string())),
            agent_id: Some(format!("agent_{}", draft.scenario_type)),
            llm_id: Some(format!("llm_{}", draft.scenario_type)),
            created_at: Some(Utc::now()),
            ..Configuration::from_draft(draft.clone())
        };
        configurations.insert(draft.scenario_type, saved.clone());

        tracing::info!(scenario_type = %draft.scenario_type, "Saved configuration");
        Ok(saved)
    }

    async fn list_configurations(&self) -> Result<Vec<Configuration>, DomainError> {
        Ok(self.configurations.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(scenario_type: ScenarioType) -> ConfigurationDraft {
        let mut draft = ConfigurationDraft::defaults(scenario_type);
        draft.system_prompt = "Ask the driver for location and ETA.".to_string();
        draft
    }

    #[tokio::test]
    async fn test_web_call_requires_configuration() {
        let backend = InMemoryBackend::new();
        let request = WebCallRequest {
            driver_name: "Anna".to_string(),
            load_number: "LOAD-1".to_string(),
            scenario_type: ScenarioType::Checkin,
        };

        let err = backend.initiate_web_call(&request).await.unwrap_err();
        assert!(matches!(err, DomainError::Api { status: 400, .. }));

        backend.save_configuration(&draft(ScenarioType::Checkin)).await.unwrap();
        let created = backend.initiate_web_call(&request).await.unwrap();

        let call = backend.get_call(&created.call_id).await.unwrap();
        assert!(call.is_web_call());
        assert_eq!(call.call_status, CallStatus::Initiated);
    }

    #[tokio::test]
    async fn test_phone_number_is_validated() {
        let backend = InMemoryBackend::new();
        backend.save_configuration(&draft(ScenarioType::Emergency)).await.unwrap();

        let mut request = PhoneCallRequest {
            driver_name: "Dan".to_string(),
            driver_phone: "555-1234".to_string(),
            load_number: "LOAD-2".to_string(),
            scenario_type: ScenarioType::Emergency,
        };
        assert!(backend.initiate_phone_call(&request).await.is_err());

        request.driver_phone = "+15551234567".to_string();
        let created = backend.initiate_phone_call(&request).await.unwrap();
        assert_eq!(created.status, Some(CallStatus::Initiated));
    }

    #[tokio::test]
    async fn test_status_never_moves_back() {
        let backend = InMemoryBackend::new();
        backend.save_configuration(&draft(ScenarioType::Checkin)).await.unwrap();
        let created = backend
            .initiate_web_call(&WebCallRequest {
                driver_name: "Anna".to_string(),
                load_number: "LOAD-1".to_string(),
                scenario_type: ScenarioType::Checkin,
            })
            .await
            .unwrap();

        backend
            .advance_call(&created.call_id, CallStatus::Completed, Some("done".to_string()), None)
            .await
            .unwrap();
        let err = backend
            .advance_call(&created.call_id, CallStatus::InProgress, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_replaces_whole_configuration() {
        let backend = InMemoryBackend::new();
        let first = backend.save_configuration(&draft(ScenarioType::Checkin)).await.unwrap();

        let mut second = draft(ScenarioType::Checkin);
        second.retell_settings.voice_speed = 1.3;
        let saved = backend.save_configuration(&second).await.unwrap();

        assert_eq!(saved.id, first.id);
        assert_eq!(backend.list_configurations().await.unwrap().len(), 1);
        assert_eq!(
            backend
                .get_configuration(ScenarioType::Checkin)
                .await
                .unwrap()
                .map(|c| c.retell_settings.voice_speed),
            Some(1.3)
        );
    }
}
