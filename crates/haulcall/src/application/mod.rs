//! Application Layer (View Models and Use Cases)
//!
//! Turns port calls into operator-facing state: loading flags, readable
//! errors, polling and the voice session lifecycle.

mod call_browser;
mod call_observer;
mod call_service;
mod call_session;
mod configuration_editor;
mod configuration_service;
mod errors;
mod request_state;
mod test_call;

pub use call_browser::{CallBrowser, EmptyState};
pub use call_observer::{CallObservation, CallObserver, ObserverConfig, CALL_STATUS_POLL_INTERVAL};
pub use call_service::CallService;
pub use call_session::{next_state, CallSession};
pub use configuration_editor::{ConfigurationEditor, EditorState};
pub use configuration_service::{ConfigurationService, SAVE_NOTICE_DURATION};
pub use errors::ViewError;
pub use request_state::RequestState;
pub use test_call::{ActiveTestCall, TestCallLauncher};
