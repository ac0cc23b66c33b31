//! OpsDesk idle tracking host
//!
//! Wires the infrastructure adapters into the session supervisor and
//! exposes the line-oriented control commands the binary serves.

pub mod commands;
pub mod context;

pub use commands::{execute, Command, Reply};
pub use context::AppContext;
