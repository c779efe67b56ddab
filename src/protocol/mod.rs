//! MCP protocol layer
//!
//! Wire types ([`types`]), per-method payloads ([`messages`]), and method
//! name constants ([`methods`]).

pub mod messages;
pub mod methods;
pub mod types;

pub use messages::*;
pub use types::*;
