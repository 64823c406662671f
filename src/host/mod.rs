//! Host command surface: versioned envelopes, typed dispatch, stdio bridge.

pub mod contract;
pub mod handler;
pub mod stdio;

pub use contract::{CommandEnvelope, CommandName, ErrorBody, EventEnvelope, ResponseEnvelope};
pub use handler::HostCommandHandler;
