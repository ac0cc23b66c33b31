//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;

use opsdesk_domain::{OpsDeskError, UserRole};
use opsdesk_infra::config;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create config file");
    file.write_all(contents.as_bytes()).expect("Failed to write config file");
    path
}

#[test]
fn test_load_full_toml_config() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "opsdesk.toml",
        r#"
[backend]
url = "https://desk.example.co"
api_key = "anon-key"
access_token = "user-jwt"
breaks_table = "breaks"
timeout_seconds = 15

[idle]
threshold_seconds = 300
exempt_roles = ["admin", "Owner"]
close_timeout_seconds = 10
enabled = true

[logging]
level = "opsdesk_core=debug,info"
json = false
"#,
    );

    let config = config::load_from_file(Some(path)).expect("config");
    config.validate().expect("valid config");

    assert_eq!(config.backend.bearer_token(), "user-jwt");
    assert_eq!(config.idle.exempt_roles, vec![UserRole::Admin, UserRole::Other("Owner".into())]);
    assert!(config.idle.is_exempt(&UserRole::Admin));
    assert!(!config.idle.is_exempt(&UserRole::Employee));
    assert_eq!(config.logging.level, "opsdesk_core=debug,info");
}

#[test]
fn test_zero_threshold_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "opsdesk.json",
        r#"{
            "backend": { "url": "https://desk.example.co", "api_key": "anon-key" },
            "idle": { "threshold_seconds": 0 }
        }"#,
    );

    let config = config::load_from_file(Some(path)).expect("parsed config");
    assert!(matches!(config.validate(), Err(OpsDeskError::Config(_))));
}

#[test]
fn test_missing_backend_section_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.toml", "[idle]\nthreshold_seconds = 60\n");

    let result = config::load_from_file(Some(path));
    assert!(matches!(result, Err(OpsDeskError::Config(msg)) if msg.contains("TOML")));
}

#[test]
fn test_serialized_config_omits_secrets() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "opsdesk.json",
        r#"{ "backend": { "url": "https://desk.example.co", "api_key": "anon-key",
                           "access_token": "user-jwt" } }"#,
    );

    let config = config::load_from_file(Some(path)).expect("config");
    let rendered = serde_json::to_string(&config).expect("serialize");
    assert!(!rendered.contains("anon-key"));
    assert!(!rendered.contains("user-jwt"));
    assert!(!format!("{:?}", config).contains("anon-key"));
}
