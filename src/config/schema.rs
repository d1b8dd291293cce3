//! Configuration schema types
//!
//! This module defines the configuration structure for Annuaire.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main Annuaire configuration
///
/// This is the root configuration structure that maps to the TOML file.
/// Every section has defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnuaireConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// FHIR registry connection
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Harvest use case parameters
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnnuaireConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.registry.validate()?;
        self.harvest.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// FHIR registry configuration
///
/// Handed to the transport and the client at construction; never mutated
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the FHIR API, without a trailing resource path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the header carrying the API key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// API key (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Page size sent as `_count` on initial searches (0 = server default)
    #[serde(default = "default_entry_limit")]
    pub entry_limit: u32,

    /// Identifier system URI of the national practitioner registry
    #[serde(default = "default_identifier_system")]
    pub identifier_system: String,
}

impl RegistryConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("registry.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("registry.base_url must start with http:// or https://".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("registry.base_url '{}' is not a valid URL", self.base_url));
        }

        if self.api_key.is_some() && self.api_key_header.trim().is_empty() {
            return Err("registry.api_key_header cannot be empty when api_key is set".to_string());
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 600 {
            return Err("registry.timeout_seconds must be between 1 and 600".to_string());
        }

        if self.entry_limit > 1000 {
            return Err("registry.entry_limit must be <= 1000".to_string());
        }

        if self.identifier_system.trim().is_empty() {
            return Err("registry.identifier_system cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_header: default_api_key_header(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            entry_limit: default_entry_limit(),
            identifier_system: default_identifier_system(),
        }
    }
}

/// Harvest use case configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Postal code prefixes searched on organizations, OR-combined
    #[serde(default = "default_postal_codes")]
    pub postal_codes: Vec<String>,

    /// Practitioner qualification code a role must match
    #[serde(default = "default_qualification_code")]
    pub qualification_code: String,

    /// Reverse-include directive embedding roles in organization pages
    #[serde(default = "default_rev_include")]
    pub rev_include: String,

    /// Stop after this many pages (unbounded when absent)
    #[serde(default)]
    pub max_pages: Option<usize>,
}

impl HarvestConfig {
    fn validate(&self) -> Result<(), String> {
        if self.postal_codes.is_empty() {
            return Err("harvest.postal_codes cannot be empty".to_string());
        }

        if let Some(code) = self
            .postal_codes
            .iter()
            .find(|code| code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(format!(
                "Invalid harvest.postal_codes entry '{code}'. Postal codes must be digits"
            ));
        }

        if self.qualification_code.trim().is_empty() {
            return Err("harvest.qualification_code cannot be empty".to_string());
        }

        if self.rev_include.trim().is_empty() {
            return Err("harvest.rev_include cannot be empty".to_string());
        }

        if self.max_pages == Some(0) {
            return Err("harvest.max_pages must be > 0 when set".to_string());
        }

        Ok(())
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            postal_codes: default_postal_codes(),
            qualification_code: default_qualification_code(),
            rev_include: default_rev_include(),
            max_pages: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://gateway.api.esante.gouv.fr/fhir/v2".to_string()
}

fn default_api_key_header() -> String {
    "ESANTE-API-KEY".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_entry_limit() -> u32 {
    50
}

fn default_identifier_system() -> String {
    "https://rpps.esante.gouv.fr".to_string()
}

fn default_postal_codes() -> Vec<String> {
    vec!["974".to_string(), "976".to_string()]
}

fn default_qualification_code() -> String {
    "70".to_string()
}

fn default_rev_include() -> String {
    "PractitionerRole:organization".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_registry_config_validation() {
        let mut config = RegistryConfig {
            api_key: Some(secret_string("key".to_string())),
            ..RegistryConfig::default()
        };
        assert!(config.validate().is_ok());

        config.base_url = "ftp://registry.example".to_string();
        assert!(config.validate().is_err());

        config.base_url = String::new();
        assert!(config.validate().is_err());

        config.base_url = "https://registry.example/fhir".to_string();
        config.api_key_header = " ".to_string();
        assert!(config.validate().is_err());

        config.api_key_header = "X-API-KEY".to_string();
        config.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.timeout_seconds = 30;
        config.entry_limit = 5000;
        assert!(config.validate().is_err());

        config.entry_limit = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_harvest_config_validation() {
        let mut config = HarvestConfig::default();
        assert!(config.validate().is_ok());

        config.postal_codes = vec![];
        assert!(config.validate().is_err());

        config.postal_codes = vec!["974".to_string(), "97A".to_string()];
        assert!(config.validate().is_err());

        config.postal_codes = vec!["974".to_string()];
        config.qualification_code = "".to_string();
        assert!(config.validate().is_err());

        config.qualification_code = "70".to_string();
        config.max_pages = Some(0);
        assert!(config.validate().is_err());

        config.max_pages = Some(3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_enabled = true;
        config.local_path = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AnnuaireConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.application.log_level, "info");
        assert_eq!(
            config.registry.base_url,
            "https://gateway.api.esante.gouv.fr/fhir/v2"
        );
        assert_eq!(config.registry.api_key_header, "ESANTE-API-KEY");
        assert!(config.registry.api_key.is_none());
        assert_eq!(config.registry.timeout(), Duration::from_secs(30));
        assert_eq!(config.registry.entry_limit, 50);
        assert_eq!(config.harvest.postal_codes, vec!["974", "976"]);
        assert_eq!(config.harvest.qualification_code, "70");
        assert_eq!(config.harvest.rev_include, "PractitionerRole:organization");
        assert_eq!(config.harvest.max_pages, None);
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let config = RegistryConfig {
            api_key: Some(secret_string("super-secret".to_string())),
            ..RegistryConfig::default()
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
