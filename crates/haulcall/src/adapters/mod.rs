//! Adapters
//!
//! Implementations of the backend ports.

mod http;
mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;
