//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "annuaire.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export your registry key: ANNUAIRE_REGISTRY_API_KEY=...");
                println!("  3. Validate configuration: annuaire validate-config");
                println!("  4. Run the harvest: annuaire harvest");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, output = %self.output, "Failed to write configuration file");
                println!("Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Annuaire Configuration File

[application]
log_level = "info"

[registry]
base_url = "https://gateway.api.esante.gouv.fr/fhir/v2"
api_key_header = "ESANTE-API-KEY"
# api_key = "${ANNUAIRE_REGISTRY_API_KEY}"
timeout_seconds = 30
entry_limit = 50

[harvest]
postal_codes = ["974", "976"]
qualification_code = "70"

[logging]
local_enabled = false
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Annuaire Configuration File
#
# Every value below is the default. Values of the form ${VAR} are replaced by
# the environment variable VAR at load time, and any setting can be overridden
# with ANNUAIRE_<SECTION>_<KEY>, e.g. ANNUAIRE_HARVEST_MAX_PAGES=2.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# FHIR Registry
# ============================================================================
[registry]
# Base URL of the FHIR API
base_url = "https://gateway.api.esante.gouv.fr/fhir/v2"

# Header carrying the API key
api_key_header = "ESANTE-API-KEY"

# API key (prefer the ANNUAIRE_REGISTRY_API_KEY environment variable)
# api_key = "${ESANTE_API_KEY}"

# Per-request timeout in seconds (1-600)
timeout_seconds = 30

# Page size of initial searches (0 = server default, max 1000)
entry_limit = 50

# Identifier system of the national practitioner registry
identifier_system = "https://rpps.esante.gouv.fr"

# ============================================================================
# Harvest
# ============================================================================
[harvest]
# Organization postal code prefixes, combined with OR
postal_codes = ["974", "976"]

# Practitioner qualification code to keep
qualification_code = "70"

# Reverse include embedding roles in organization pages
rev_include = "PractitionerRole:organization"

# Stop after this many pages (unset = walk every page)
# max_pages = 10

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON logs to local_path in addition to the console
local_enabled = false

# Directory of the log files
local_path = "./logs"

# Log rotation (daily, hourly or never)
local_rotation = "daily"
"#
        .to_string()
    }
}
