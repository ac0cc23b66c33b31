//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Attempt to load from environment variables
//! 2. If the required variables are missing, fall back to a config file
//! 3. Probe the standard paths when no file is given
//! 4. JSON and TOML are both accepted (chosen by extension)
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `OPSDESK_BACKEND_URL` (required): gateway base url
//! - `OPSDESK_BACKEND_API_KEY` (required): gateway key
//! - `OPSDESK_BACKEND_ACCESS_TOKEN`: signed-in user's token
//! - `OPSDESK_BACKEND_BREAKS_TABLE`: break table name
//! - `OPSDESK_BACKEND_TIMEOUT`: request timeout in seconds
//! - `OPSDESK_IDLE_THRESHOLD`: idle threshold in seconds
//! - `OPSDESK_IDLE_CLOSE_TIMEOUT`: bound for the close issued on dispose
//! - `OPSDESK_IDLE_ENABLED`: whether idle tracking runs (true/false)
//! - `OPSDESK_LOG` or `RUST_LOG`: log filter
//! - `OPSDESK_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! `opsdesk.{json,toml}` then `config.{json,toml}`, in the working
//! directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use opsdesk_domain::{BackendConfig, Config, IdleConfig, LoggingConfig, OpsDeskError, Result};

const FILE_STEMS: [&str; 2] = ["opsdesk", "config"];
const FILE_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `OpsDeskError::Config` if no source yields a complete and valid
/// configuration.
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from `OPSDESK_*` environment variables.
///
/// Only the backend url and key are required; everything else falls back
/// to the defaults.
///
/// # Errors
/// Returns `OpsDeskError::Config` if a required variable is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut backend =
        BackendConfig::new(env_var("OPSDESK_BACKEND_URL")?, env_var("OPSDESK_BACKEND_API_KEY")?);
    backend.access_token = env_opt("OPSDESK_BACKEND_ACCESS_TOKEN");
    if let Some(table) = env_opt("OPSDESK_BACKEND_BREAKS_TABLE") {
        backend.breaks_table = table;
    }
    if let Some(timeout) = env_parse("OPSDESK_BACKEND_TIMEOUT", "backend timeout")? {
        backend.timeout_seconds = timeout;
    }

    let mut idle = IdleConfig::default();
    if let Some(threshold) = env_parse("OPSDESK_IDLE_THRESHOLD", "idle threshold")? {
        idle.threshold_seconds = threshold;
    }
    if let Some(timeout) = env_parse("OPSDESK_IDLE_CLOSE_TIMEOUT", "idle close timeout")? {
        idle.close_timeout_seconds = timeout;
    }
    idle.enabled = env_bool("OPSDESK_IDLE_ENABLED", idle.enabled);

    let mut logging = LoggingConfig::default();
    if let Some(level) = env_opt("OPSDESK_LOG").or_else(|| env_opt("RUST_LOG")) {
        logging.level = level;
    }
    logging.json = env_bool("OPSDESK_LOG_JSON", logging.json);

    Ok(Config { backend, idle, logging })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`].
///
/// # Errors
/// Returns `OpsDeskError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(OpsDeskError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            OpsDeskError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| OpsDeskError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| OpsDeskError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| OpsDeskError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(OpsDeskError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Return the first existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    candidates(&roots).into_iter().find(|path| path.exists())
}

fn candidates(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| {
            FILE_STEMS.iter().flat_map(move |stem| {
                FILE_EXTENSIONS.iter().map(move |ext| root.join(format!("{}.{}", stem, ext)))
            })
        })
        .collect()
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        OpsDeskError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Set and non-blank.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| OpsDeskError::Config(format!("Invalid {} in {}: {}", what, key, e)))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
