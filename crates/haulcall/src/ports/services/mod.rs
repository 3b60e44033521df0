//! Service Ports
//!
//! Abstract interfaces for the backend resource groups.

mod calls_api;
mod configurations_api;

pub use calls_api::*;
pub use configurations_api::*;
