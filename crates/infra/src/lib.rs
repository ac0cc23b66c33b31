//! # OpsDesk Infrastructure
//!
//! Adapters for the ports defined in `opsdesk-core`:
//! - REST break ledger over a single-attempt gateway HTTP client
//! - In-process activity source fed by the host's input events
//! - Log-backed break notifier
//! - Configuration loading and `tracing` setup
//!
//! Everything that touches the network, the filesystem or the process
//! environment lives here.

pub mod activity;
pub mod config;
pub mod errors;
pub mod http;
pub mod ledger;
pub mod notify;
pub mod observability;

pub use activity::ChannelActivitySource;
pub use errors::InfraError;
pub use http::HttpClient;
pub use ledger::RestBreakLedger;
pub use notify::TracingBreakNotifier;
pub use observability::init_tracing;
