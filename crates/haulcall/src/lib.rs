//! Haulcall Library
//!
//! Operator-side core of the logistics voice agent: per-scenario agent
//! configuration, browser-style test calls and review of past calls.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure entities and logic
//!   - `entities/`: Call, Configuration, request/response records
//!   - `value_objects/`: CallStatus, ScenarioType, SortOrder, SessionState
//!   - `errors/`: Port-level error type
//!   - `formatters/`: Display helpers
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `services/`: Calls and configurations backend APIs
//!   - `voice/`: Real-time voice client
//!
//! - **Adapters** (`adapters/`): Port implementations (HTTP, in-memory)
//!
//! - **Application** (`application/`): View models and use cases
//!
//! # Usage
//!
//! ```rust,ignore
//! use haulcall::{CallObserver, HttpBackend};
//!
//! let backend = Arc::new(HttpBackend::new("http://localhost:8000"));
//! let mut observation = CallObserver::new(backend).observe("call-1");
//! while let Some(snapshot) = observation.next().await {
//!     println!("{:?}", snapshot?.call_status);
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use adapters::{HttpBackend, InMemoryBackend};
pub use application::{
    ActiveTestCall, CallBrowser, CallObservation, CallObserver, CallService, CallSession,
    ConfigurationEditor, ConfigurationService, EditorState, EmptyState, ObserverConfig,
    RequestState, TestCallLauncher, ViewError, CALL_STATUS_POLL_INTERVAL, SAVE_NOTICE_DURATION,
};
pub use domain::{
    Call, CallStatus, Configuration, ConfigurationDraft, DomainError, FieldValue,
    PhoneCallInitiated, PhoneCallRequest, RetellSettings, ScenarioType, SessionState, SortOrder,
    WebCallInitiated, WebCallRequest,
};
pub use ports::{CallsApi, ConfigurationsApi, VoiceClient, VoiceClientError, VoiceEvent};
