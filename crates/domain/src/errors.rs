//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for OpsDesk
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum OpsDeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// The hosted backend rejected or failed the request (5xx, malformed body).
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Host environment failure (activity source wiring, runtime).
    #[error("Platform error: {0}")]
    Platform(String),

    /// Idle status requested while no monitor is active for the session.
    #[error("Idle monitor is not active for this session")]
    MonitorInactive,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OpsDeskError {
    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Backend(_) => "backend",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Platform(_) => "platform",
            Self::MonitorInactive => "monitor_inactive",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for OpsDesk operations
pub type Result<T> = std::result::Result<T, OpsDeskError>;
