//! Call - Voice Agent Interaction Record
//!
//! Pure domain entity without infrastructure dependencies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CallStatus, ScenarioType};

/// Phone value the backend stores for browser-originated calls
pub const WEB_CALL_PHONE_MARKER: &str = "web-call";

/// Value extracted from a transcript after the call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// The extractor could not determine the field
    Null,
}

/// Call - Record of one voice agent interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub id: String,
    pub driver_name: String,
    #[serde(default)]
    pub driver_phone: Option<String>,
    pub load_number: String,
    pub scenario_type: ScenarioType,
    pub call_status: CallStatus,
    #[serde(default)]
    pub retell_call_id: Option<String>,
    #[serde(default)]
    pub raw_transcript: Option<String>,
    #[serde(default)]
    pub structured_data: Option<BTreeMap<String, FieldValue>>,
    pub created_at: DateTime<Utc>,
}

impl Call {
    /// Call placed from the browser rather than a phone line
    pub fn is_web_call(&self) -> bool {
        self.driver_phone.as_deref() == Some(WEB_CALL_PHONE_MARKER)
    }

    /// Phone number for display, hiding the web call marker
    pub fn display_phone(&self) -> Option<&str> {
        self.driver_phone
            .as_deref()
            .filter(|phone| *phone != WEB_CALL_PHONE_MARKER)
    }

    /// Post-call processing has produced a transcript or extracted data
    pub fn has_results(&self) -> bool {
        self.raw_transcript.is_some() || self.structured_data.is_some()
    }

    /// Case-insensitive driver name match; blank queries match everything
    pub fn matches_driver(&self, query: &str) -> bool {
        if query.trim().is_empty() {
            return true;
        }
        self.driver_name
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

// ============================================
// Request/Response Records
// ============================================

/// Body of `POST /api/calls/initiate-web`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebCallRequest {
    pub driver_name: String,
    pub load_number: String,
    pub scenario_type: ScenarioType,
}

/// Response of `POST /api/calls/initiate-web`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebCallInitiated {
    pub call_id: String,
    /// One-time credential for the voice session
    pub access_token: String,
    #[serde(default)]
    pub retell_call_id: Option<String>,
}

/// Body of `POST /api/calls/initiate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneCallRequest {
    pub driver_name: String,
    pub driver_phone: String,
    pub load_number: String,
    pub scenario_type: ScenarioType,
}

/// Response of `POST /api/calls/initiate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneCallInitiated {
    pub call_id: String,
    #[serde(default)]
    pub retell_call_id: Option<String>,
    #[serde(default)]
    pub status: Option<CallStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend_record() -> serde_json::Value {
        json!({
            "id": "5d1f0a0e-2f7c-4d3e-9a51-3a3c2b0c9e11",
            "driver_name": "Mike Johnson",
            "driver_phone": "web-call",
            "load_number": "LOAD-7781",
            "scenario_type": "checkin",
            "call_status": "completed",
            "retell_call_id": "call_8f2e",
            "raw_transcript": "Agent: Hi Mike...",
            "structured_data": {
                "call_outcome": "In-Transit Update",
                "driver_status": "Driving",
                "eta_hours": 4,
                "pod_reminder_acknowledged": true,
                "current_location": null
            },
            "created_at": "2025-01-14T16:02:11.512874+00:00",
            "updated_at": "2025-01-14T16:06:40+00:00"
        })
    }

    #[test]
    fn test_decode_backend_record() {
        let call: Call = serde_json::from_value(backend_record()).unwrap();

        assert_eq!(call.call_status, CallStatus::Completed);
        assert!(call.is_web_call());
        assert_eq!(call.display_phone(), None);
        assert!(call.has_results());

        let data = call.structured_data.unwrap();
        assert_eq!(data["eta_hours"], FieldValue::Number(4.0));
        assert_eq!(data["pod_reminder_acknowledged"], FieldValue::Bool(true));
        assert_eq!(data["current_location"], FieldValue::Null);
        assert_eq!(
            data["driver_status"],
            FieldValue::Text("Driving".to_string())
        );
    }

    #[test]
    fn test_pending_call_has_no_results() {
        let mut record = backend_record();
        record["call_status"] = json!("initiated");
        record["raw_transcript"] = json!(null);
        record["structured_data"] = json!(null);
        record["driver_phone"] = json!("+15551234567");

        let call: Call = serde_json::from_value(record).unwrap();
        assert!(!call.has_results());
        assert!(!call.is_web_call());
        assert_eq!(call.display_phone(), Some("+15551234567"));
    }

    #[test]
    fn test_driver_match_is_case_insensitive() {
        let mut call: Call = serde_json::from_value(backend_record()).unwrap();
        call.driver_name = "Annette".to_string();

        assert!(call.matches_driver("ann"));
        assert!(call.matches_driver("NETT"));
        assert!(call.matches_driver("   "));
        assert!(!call.matches_driver("dan"));
    }
}
