//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX`.

use annuaire::config::load_config;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for name in [
        "ANNUAIRE_APPLICATION_LOG_LEVEL",
        "ANNUAIRE_REGISTRY_API_KEY",
        "ANNUAIRE_REGISTRY_ENTRY_LIMIT",
        "ANNUAIRE_HARVEST_POSTAL_CODES",
        "ANNUAIRE_HARVEST_MAX_PAGES",
        "TEST_ESANTE_API_KEY",
    ] {
        std::env::remove_var(name);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[registry]
base_url = "https://registry.example/fhir/v2"
api_key_header = "X-API-KEY"
api_key = "literal-key"
timeout_seconds = 10
entry_limit = 100
identifier_system = "https://rpps.esante.gouv.fr"

[harvest]
postal_codes = ["976"]
qualification_code = "40"
rev_include = "PractitionerRole:organization"
max_pages = 4

[logging]
local_enabled = true
local_path = "/tmp/annuaire-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.registry.base_url, "https://registry.example/fhir/v2");
    assert_eq!(config.registry.api_key_header, "X-API-KEY");
    assert_eq!(
        config
            .registry
            .api_key
            .as_ref()
            .unwrap()
            .expose_secret()
            .as_str(),
        "literal-key"
    );
    assert_eq!(config.registry.timeout_seconds, 10);
    assert_eq!(config.registry.entry_limit, 100);
    assert_eq!(config.harvest.postal_codes, vec!["976"]);
    assert_eq!(config.harvest.qualification_code, "40");
    assert_eq!(config.harvest.max_pages, Some(4));
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_empty_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.registry.entry_limit, 50);
    assert_eq!(config.registry.timeout_seconds, 30);
    assert_eq!(config.harvest.postal_codes, vec!["974", "976"]);
    assert_eq!(config.harvest.qualification_code, "70");
    assert!(config.registry.api_key.is_none());
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_ESANTE_API_KEY", "from-env");

    let file = write_config(
        r#"
[registry]
api_key = "${TEST_ESANTE_API_KEY}"
"#,
    );
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(
        config
            .registry
            .api_key
            .as_ref()
            .unwrap()
            .expose_secret()
            .as_str(),
        "from-env"
    );
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[registry]
api_key = "${TEST_ESANTE_API_KEY}"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_ESANTE_API_KEY"));
}

#[test]
fn test_env_overrides_beat_file_values() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("ANNUAIRE_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("ANNUAIRE_REGISTRY_ENTRY_LIMIT", "20");
    std::env::set_var("ANNUAIRE_HARVEST_POSTAL_CODES", "976, 974");
    std::env::set_var("ANNUAIRE_HARVEST_MAX_PAGES", "2");
    std::env::set_var("ANNUAIRE_REGISTRY_API_KEY", "override-key");

    let file = write_config(
        r#"
[application]
log_level = "info"

[registry]
entry_limit = 50

[harvest]
postal_codes = ["974"]
"#,
    );
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.registry.entry_limit, 20);
    assert_eq!(config.harvest.postal_codes, vec!["976", "974"]);
    assert_eq!(config.harvest.max_pages, Some(2));
    assert!(config.registry.api_key.is_some());
}

#[test]
fn test_unparsable_override_is_config_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("ANNUAIRE_HARVEST_MAX_PAGES", "many");

    let file = write_config("");
    let result = load_config(file.path());
    cleanup_env_vars();

    assert!(result.is_err());
}

#[test]
fn test_validation_failures() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for contents in [
        "[registry]\nbase_url = \"ftp://registry.example\"\n",
        "[registry]\ntimeout_seconds = 0\n",
        "[registry]\nentry_limit = 5000\n",
        "[harvest]\npostal_codes = [\"97A\"]\n",
        "[harvest]\nmax_pages = 0\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
        "[application]\nlog_level = \"loud\"\n",
    ] {
        let file = write_config(contents);
        assert!(
            load_config(file.path()).is_err(),
            "expected validation failure for {contents:?}"
        );
    }
}

#[test]
fn test_missing_file() {
    let result = load_config("/nonexistent/annuaire.toml");
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Configuration file not found"));
}
