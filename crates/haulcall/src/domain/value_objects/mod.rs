//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod call_status;
mod scenario_type;
mod session_state;
mod sort_order;

pub use call_status::*;
pub use scenario_type::*;
pub use session_state::*;
pub use sort_order::*;
