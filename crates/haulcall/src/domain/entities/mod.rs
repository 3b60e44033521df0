//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Call: One voice agent interaction and its results
//! - Configuration: Per-scenario prompt and voice settings

mod call;
mod configuration;

pub use call::*;
pub use configuration::*;
