//! Logging setup for binaries embedding the idle monitor.

pub mod logging;

pub use logging::{env_filter, init_tracing};
