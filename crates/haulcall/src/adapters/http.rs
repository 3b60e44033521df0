//! HTTP Backend Adapter
//!
//! reqwest implementation of the calls and configurations ports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::{
    errors::DomainError, Call, Configuration, ConfigurationDraft, PhoneCallInitiated,
    PhoneCallRequest, ScenarioType, SortOrder, WebCallInitiated, WebCallRequest,
};
use crate::ports::{CallsApi, ConfigurationsApi};

/// API client for the voice agent backend
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// FastAPI error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpBackend {
    /// Create a new API client
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Send `Authorization: Bearer <key>` with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool, DomainError> {
        let resp = self
            .request(Method::GET, "/health")
            .send()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        Ok(resp.status().is_success())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Backend request");

        let builder = self.client.request(method, &url);
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, DomainError> {
        builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to connect to backend");
            DomainError::Transport(e.to_string())
        })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, DomainError> {
        if !resp.status().is_success() {
            return Err(Self::api_error(resp).await);
        }
        resp.json::<T>()
            .await
            .map_err(|e| DomainError::Decode(e.to_string()))
    }

    async fn api_error(resp: Response) -> DomainError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| detail_message(&body.detail))
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()));

        tracing::warn!(status, detail = ?detail, "Backend returned an error");
        DomainError::Api { status, detail }
    }
}

/// FastAPI sends either a string or a list of validation errors
fn detail_message(detail: &serde_json::Value) -> Option<String> {
    match detail {
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

#[async_trait]
impl CallsApi for HttpBackend {
    async fn initiate_web_call(
        &self,
        request: &WebCallRequest,
    ) -> Result<WebCallInitiated, DomainError> {
        let resp = self
            .dispatch(self.request(Method::POST, "/api/calls/initiate-web").json(request))
            .await?;
        Self::decode(resp).await
    }

    async fn initiate_phone_call(
        &self,
        request: &PhoneCallRequest,
    ) -> Result<PhoneCallInitiated, DomainError> {
        let resp = self
            .dispatch(self.request(Method::POST, "/api/calls/initiate").json(request))
            .await?;
        Self::decode(resp).await
    }

    async fn get_call(&self, call_id: &str) -> Result<Call, DomainError> {
        let path = format!("/api/calls/{}", urlencoding::encode(call_id));
        let resp = self.dispatch(self.request(Method::GET, &path)).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::not_found("Call", call_id));
        }
        Self::decode(resp).await
    }

    async fn list_calls(&self, order: SortOrder) -> Result<Vec<Call>, DomainError> {
        let ascending = order.is_ascending().to_string();
        let builder = self
            .request(Method::GET, "/api/calls")
            .query(&[("order_by", "created_at"), ("ascending", ascending.as_str())]);

        let resp = self.dispatch(builder).await?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl ConfigurationsApi for HttpBackend {
    async fn get_configuration(
        &self,
        scenario_type: ScenarioType,
    ) -> Result<Option<Configuration>, DomainError> {
        let path = format!("/api/configurations/{}", scenario_type);
        let resp = self.dispatch(self.request(Method::GET, &path)).await?;

        // Not configured yet, a normal outcome
        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!(%scenario_type, "No configuration stored");
            return Ok(None);
        }
        Self::decode(resp).await.map(Some)
    }

    async fn save_configuration(
        &self,
        draft: &ConfigurationDraft,
    ) -> Result<Configuration, DomainError> {
        let resp = self
            .dispatch(self.request(Method::POST, "/api/configurations").json(draft))
            .await?;
        Self::decode(resp).await
    }

    async fn list_configurations(&self) -> Result<Vec<Configuration>, DomainError> {
        let resp = self
            .dispatch(self.request(Method::GET, "/api/configurations"))
            .await?;
        Self::decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CallStatus;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn call_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "driver_name": "Anna Kowalski",
            "driver_phone": "web-call",
            "load_number": "LOAD-1001",
            "scenario_type": "emergency",
            "call_status": status,
            "created_at": "2025-02-03T09:15:00+00:00"
        })
    }

    #[tokio::test]
    async fn test_get_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/calls/call-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(call_json("call-1", "in_progress")))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let call = backend.get_call("call-1").await.unwrap();

        assert_eq!(call.id, "call-1");
        assert_eq!(call.call_status, CallStatus::InProgress);
        assert_eq!(call.scenario_type, ScenarioType::Emergency);
    }

    #[tokio::test]
    async fn test_missing_call_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/calls/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Call not found" })))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let err = backend.get_call("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_calls_passes_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/calls"))
            .and(query_param("order_by", "created_at"))
            .and(query_param("ascending", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                call_json("a", "completed"),
                call_json("b", "initiated")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let calls = backend.list_calls(SortOrder::Ascending).await.unwrap();

        let ids: Vec<&str> = calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_missing_configuration_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/configurations/emergency"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "detail": "Configuration not found for scenario: emergency"
            })))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let config = backend
            .get_configuration(ScenarioType::Emergency)
            .await
            .unwrap();
        assert!(config.is_none());
    }

    #[tokio::test]
    async fn test_save_sends_full_draft() {
        let server = MockServer::start().await;
        let mut draft = ConfigurationDraft::defaults(ScenarioType::Checkin);
        draft.system_prompt = "Check in with the driver about load status.".to_string();

        let mut stored = serde_json::to_value(&draft).unwrap();
        stored["id"] = json!("cfg-1");
        stored["agent_id"] = json!("agent_123");
        stored["created_at"] = json!("2025-02-03T09:00:00+00:00");

        Mock::given(method("POST"))
            .and(path("/api/configurations"))
            .and(header("Authorization", "Bearer secret"))
            .and(body_json(&draft))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).with_api_key("secret");
        let saved = backend.save_configuration(&draft).await.unwrap();

        assert_eq!(ConfigurationDraft::from(&saved), draft);
        assert_eq!(saved.agent_id.as_deref(), Some("agent_123"));
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/calls/initiate-web"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "detail": "No agent configured for scenario: checkin"
            })))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let request = WebCallRequest {
            driver_name: "Dan".to_string(),
            load_number: "LOAD-9".to_string(),
            scenario_type: ScenarioType::Checkin,
        };
        let err = backend.initiate_web_call(&request).await.unwrap_err();

        assert_eq!(
            err,
            DomainError::Api {
                status: 400,
                detail: Some("No agent configured for scenario: checkin".to_string()),
            }
        );
    }

    #[test]
    fn test_validation_detail_list() {
        let detail = json!([
            { "loc": ["body", "driver_name"], "msg": "field required" },
            { "loc": ["body", "load_number"], "msg": "field required" }
        ]);
        assert_eq!(
            detail_message(&detail).as_deref(),
            Some("field required; field required")
        );
    }
}
