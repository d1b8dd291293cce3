//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Annuaire configuration file.

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{load_config, AnnuaireConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates, so any failure here is a configuration
    /// error.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("Configuration is valid");
                println!();
                print_summary(&config);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                println!("Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(EXIT_CONFIG)
            }
        }
    }
}

fn print_summary(config: &AnnuaireConfig) {
    let api_key = match &config.registry.api_key {
        Some(key) if !key.expose_secret().is_blank() => "configured",
        _ => "not set",
    };

    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Registry: {}", config.registry.base_url);
    println!(
        "  API Key: {} (header {})",
        api_key, config.registry.api_key_header
    );
    println!("  Timeout: {}s", config.registry.timeout_seconds);
    println!("  Entry Limit: {}", config.registry.entry_limit);
    println!("  Postal Codes: {:?}", config.harvest.postal_codes);
    println!("  Qualification: {}", config.harvest.qualification_code);
    match config.harvest.max_pages {
        Some(max) => println!("  Max Pages: {max}"),
        None => println!("  Max Pages: unlimited"),
    }
    println!(
        "  File Logging: {}",
        if config.logging.local_enabled {
            config.logging.local_path.as_str()
        } else {
            "disabled"
        }
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let code = ValidateArgs {}
            .execute(&path.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_invalid_value_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("annuaire.toml");
        fs::write(&path, "[registry]\ntimeout_seconds = 0\n").unwrap();

        let code = ValidateArgs {}
            .execute(&path.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_empty_file_is_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("annuaire.toml");
        fs::write(&path, "").unwrap();

        let code = ValidateArgs {}
            .execute(&path.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }
}
