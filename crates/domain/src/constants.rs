//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Idle detection
pub const DEFAULT_IDLE_THRESHOLD_SECS: u64 = 300;
pub const DEFAULT_IDLE_CLOSE_TIMEOUT_SECS: u64 = 10;

// Break ledger
pub const AUTO_IDLE_BREAK_TYPE: &str = "auto_idle";
pub const DEFAULT_BREAKS_TABLE: &str = "breaks";
pub const REST_PATH_PREFIX: &str = "rest/v1";

// Backend client
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 15;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
