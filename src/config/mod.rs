//! Configuration management for Annuaire.
//!
//! # Overview
//!
//! Annuaire uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ANNUAIRE_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use annuaire::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("annuaire.toml")?;
//! println!("Registry: {}", config.registry.base_url);
//! println!("Postal codes: {:?}", config.harvest.postal_codes);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`RegistryConfig`] - FHIR registry URL, API key, timeout and page size
//! - [`HarvestConfig`] - Postal codes, qualification code and page cap
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [registry]
//! base_url = "https://gateway.api.esante.gouv.fr/fhir/v2"
//! api_key_header = "ESANTE-API-KEY"
//! api_key = "${ESANTE_API_KEY}"
//! timeout_seconds = 30
//! entry_limit = 50
//!
//! [harvest]
//! postal_codes = ["974", "976"]
//! qualification_code = "70"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{AnnuaireConfig, ApplicationConfig, HarvestConfig, LoggingConfig, RegistryConfig};
pub use secret::{secret_string, SecretString, SecretValue};
