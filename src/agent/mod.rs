// src/agent/mod.rs
mod host;
mod lifecycle;
mod state;

pub use host::{parse_addresses, parse_os_description, HostFacts};
pub use lifecycle::Agent;
pub use state::AgentState;
