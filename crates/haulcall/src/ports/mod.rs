//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the application layer
//! talks to external systems (backend API, voice transport).
//!
//! Implementations of these traits live in `adapters/` or outside the crate.

pub mod services;
pub mod voice;

// Re-exports
pub use services::*;
pub use voice::*;
