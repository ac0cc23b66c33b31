//! Idle detection and automatic break recording
//!
//! A monitor watches qualifying input activity for one signed-in user. After
//! the configured threshold without activity it opens an `auto_idle` break in
//! the ledger; the next activity closes that break with a whole-minute
//! duration. Ledger calls never block event handling and their failures are
//! logged, not surfaced.

pub mod machine;
pub mod monitor;
pub mod ports;
pub mod supervisor;
