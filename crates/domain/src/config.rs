//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKEND_TIMEOUT_SECS, DEFAULT_BREAKS_TABLE, DEFAULT_IDLE_CLOSE_TIMEOUT_SECS,
    DEFAULT_IDLE_THRESHOLD_SECS, DEFAULT_LOG_LEVEL,
};
use crate::errors::{OpsDeskError, Result};
use crate::types::UserRole;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub idle: IdleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            return Err(OpsDeskError::Config("backend url must not be empty".into()));
        }
        if self.backend.api_key.trim().is_empty() {
            return Err(OpsDeskError::Config("backend api key must not be empty".into()));
        }
        self.idle.validate()
    }
}

/// Hosted backend (REST gateway in front of Postgres)
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Signed-in user's JWT. When absent the API key doubles as bearer.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    #[serde(default = "default_breaks_table")]
    pub breaks_table: String,
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u64,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            access_token: None,
            breaks_table: default_breaks_table(),
            timeout_seconds: default_backend_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Token sent in the `Authorization` header.
    pub fn bearer_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("breaks_table", &self.breaks_table)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Idle detection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleConfig {
    #[serde(default = "default_idle_threshold")]
    pub threshold_seconds: u64,
    /// Roles that are never idle-tracked.
    #[serde(default = "default_exempt_roles")]
    pub exempt_roles: Vec<UserRole>,
    /// Upper bound for the best-effort close issued when a monitor is
    /// disposed while idle.
    #[serde(default = "default_close_timeout")]
    pub close_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl IdleConfig {
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(self.threshold_seconds)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_seconds)
    }

    pub fn is_exempt(&self, role: &UserRole) -> bool {
        self.exempt_roles.contains(role)
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold_seconds == 0 {
            return Err(OpsDeskError::Config("idle threshold must be greater than zero".into()));
        }
        Ok(())
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            threshold_seconds: DEFAULT_IDLE_THRESHOLD_SECS,
            exempt_roles: default_exempt_roles(),
            close_timeout_seconds: DEFAULT_IDLE_CLOSE_TIMEOUT_SECS,
            enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_breaks_table() -> String {
    DEFAULT_BREAKS_TABLE.to_string()
}

fn default_backend_timeout() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_SECS
}

fn default_idle_threshold() -> u64 {
    DEFAULT_IDLE_THRESHOLD_SECS
}

fn default_close_timeout() -> u64 {
    DEFAULT_IDLE_CLOSE_TIMEOUT_SECS
}

fn default_exempt_roles() -> Vec<UserRole> {
    vec![UserRole::Admin]
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_true() -> bool {
    true
}
