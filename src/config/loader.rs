//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AnnuaireConfig;
use super::secret::secret_string;
use crate::domain::errors::AnnuaireError;
use crate::domain::result::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

static ENV_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid"));

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AnnuaireConfig
/// 4. Applies environment variable overrides (ANNUAIRE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - A referenced environment variable is not set
/// - TOML parsing fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use annuaire::config::loader::load_config;
///
/// let config = load_config("annuaire.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnnuaireConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AnnuaireError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AnnuaireError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`], from an in-memory TOML document
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from_str(contents: &str) -> Result<AnnuaireConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AnnuaireConfig = toml::from_str(&contents)
        .map_err(|e| AnnuaireError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AnnuaireError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut missing_vars: Vec<String> = Vec::new();

    let lines: Vec<String> = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }
            ENV_PLACEHOLDER
                .replace_all(line, |caps: &regex::Captures<'_>| {
                    let var_name = &caps[1];
                    std::env::var(var_name).unwrap_or_else(|_| {
                        if !missing_vars.iter().any(|v| v == var_name) {
                            missing_vars.push(var_name.to_string());
                        }
                        String::new()
                    })
                })
                .into_owned()
        })
        .collect();

    if !missing_vars.is_empty() {
        return Err(AnnuaireError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        AnnuaireError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using ANNUAIRE_* prefix
///
/// Environment variables follow the pattern: ANNUAIRE_<SECTION>_<KEY>
/// For example: ANNUAIRE_REGISTRY_BASE_URL, ANNUAIRE_HARVEST_POSTAL_CODES
///
/// # Errors
///
/// Returns an error when a numeric or boolean override cannot be parsed
fn apply_env_overrides(config: &mut AnnuaireConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("ANNUAIRE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Registry overrides
    if let Some(val) = var("ANNUAIRE_REGISTRY_BASE_URL") {
        config.registry.base_url = val;
    }
    if let Some(val) = var("ANNUAIRE_REGISTRY_API_KEY_HEADER") {
        config.registry.api_key_header = val;
    }
    if let Some(val) = var("ANNUAIRE_REGISTRY_API_KEY") {
        config.registry.api_key = Some(secret_string(val));
    }
    if let Some(val) = var("ANNUAIRE_REGISTRY_TIMEOUT_SECONDS") {
        config.registry.timeout_seconds = parse_override("ANNUAIRE_REGISTRY_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("ANNUAIRE_REGISTRY_ENTRY_LIMIT") {
        config.registry.entry_limit = parse_override("ANNUAIRE_REGISTRY_ENTRY_LIMIT", &val)?;
    }
    if let Some(val) = var("ANNUAIRE_REGISTRY_IDENTIFIER_SYSTEM") {
        config.registry.identifier_system = val;
    }

    // Harvest overrides
    if let Some(val) = var("ANNUAIRE_HARVEST_POSTAL_CODES") {
        config.harvest.postal_codes = val
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(val) = var("ANNUAIRE_HARVEST_QUALIFICATION_CODE") {
        config.harvest.qualification_code = val;
    }
    if let Some(val) = var("ANNUAIRE_HARVEST_REV_INCLUDE") {
        config.harvest.rev_include = val;
    }
    if let Some(val) = var("ANNUAIRE_HARVEST_MAX_PAGES") {
        config.harvest.max_pages = Some(parse_override("ANNUAIRE_HARVEST_MAX_PAGES", &val)?);
    }

    // Logging overrides
    if let Some(val) = var("ANNUAIRE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("ANNUAIRE_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("ANNUAIRE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("ANNUAIRE_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
