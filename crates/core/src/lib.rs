//! # OpsDesk Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The idle/active state machine and its auto-break bookkeeping
//! - The idle monitor task and the per-session supervisor
//! - Port/adapter interfaces (traits) for the break ledger, the activity
//!   event source, resume notifications and the clock
//!
//! ## Architecture Principles
//! - Only depends on `opsdesk-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod idle;

// Re-export specific items to avoid ambiguity
pub use idle::machine::{IdleEffect, IdleMachine};
pub use idle::monitor::{IdleDependencies, IdleMonitorHandle, IdleStatusView};
pub use idle::ports::{
    ActivitySink, ActivitySource, ActivitySubscription, BreakLedger, BreakNotifier, Clock,
    MonotonicClock,
};
pub use idle::supervisor::IdleSupervisor;
