//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Annuaire using clap.

pub mod commands;

use crate::config::{load_config, AnnuaireConfig, LoggingConfig};
use clap::{Parser, Subcommand};

/// Annuaire - FHIR healthcare directory harvester
#[derive(Parser, Debug)]
#[command(name = "annuaire")]
#[command(version, about, long_about = None)]
#[command(author = "Annuaire Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "annuaire.toml", env = "ANNUAIRE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ANNUAIRE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harvest qualified practitioners from the registry
    Harvest(commands::harvest::HarvestArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Log level and logging settings for this invocation
    ///
    /// `--log-level` wins over `[application] log_level`. File logging
    /// follows `[logging]` when the configuration loads; otherwise logs stay
    /// on the console and the command reports the configuration error.
    pub fn logging_settings(&self) -> (String, LoggingConfig) {
        let config = match self.command {
            Commands::Init(_) => None,
            _ => load_config(&self.config).ok(),
        };
        resolve_logging(self.log_level.as_deref(), config.as_ref())
    }
}

fn resolve_logging(
    cli_level: Option<&str>,
    config: Option<&AnnuaireConfig>,
) -> (String, LoggingConfig) {
    let level = cli_level
        .or_else(|| config.map(|c| c.application.log_level.as_str()))
        .unwrap_or("info")
        .to_string();
    let logging = config.map(|c| c.logging.clone()).unwrap_or_default();
    (level, logging)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_parse_harvest() {
        let cli = Cli::parse_from(["annuaire", "harvest"]);
        assert_eq!(cli.config, "annuaire.toml");
        assert!(matches!(cli.command, Commands::Harvest(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["annuaire", "--config", "custom.toml", "harvest"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["annuaire", "--log-level", "debug", "harvest"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_harvest_overrides() {
        let cli = Cli::parse_from([
            "annuaire",
            "harvest",
            "--postal-code",
            "976",
            "--max-pages",
            "2",
            "--output",
            "json",
        ]);
        let Commands::Harvest(args) = cli.command else {
            panic!("expected harvest");
        };
        assert_eq!(args.postal_code.as_deref(), Some("976"));
        assert_eq!(args.max_pages, Some(2));
        assert_eq!(args.output, commands::harvest::OutputFormat::Json);
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["annuaire", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["annuaire", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_logging_defaults_without_config() {
        let (level, logging) = resolve_logging(None, None);
        assert_eq!(level, "info");
        assert!(!logging.local_enabled);
    }

    #[test]
    fn test_logging_follows_config_and_flag_wins() {
        let mut config = AnnuaireConfig::default();
        config.application.log_level = "debug".to_string();
        config.logging.local_enabled = true;
        config.logging.local_rotation = "hourly".to_string();

        let (level, logging) = resolve_logging(None, Some(&config));
        assert_eq!(level, "debug");
        assert!(logging.local_enabled);
        assert_eq!(logging.local_rotation, "hourly");

        let (level, _) = resolve_logging(Some("warn"), Some(&config));
        assert_eq!(level, "warn");
    }

    #[test]
    fn test_logging_settings_read_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[application]\nlog_level = \"trace\"\n\n[logging]\nlocal_enabled = true\nlocal_path = \"/tmp/annuaire-logs\"\n"
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::parse_from(["annuaire", "--config", &path, "validate-config"]);
        let (level, logging) = cli.logging_settings();
        assert_eq!(level, "trace");
        assert!(logging.local_enabled);
        assert_eq!(logging.local_path, "/tmp/annuaire-logs");

        let cli = Cli::parse_from(["annuaire", "--config", &path, "init"]);
        let (level, logging) = cli.logging_settings();
        assert_eq!(level, "info");
        assert!(!logging.local_enabled);
    }

    #[test]
    fn test_unreadable_config_keeps_console_logging() {
        let cli = Cli::parse_from(["annuaire", "--config", "/nonexistent/annuaire.toml", "harvest"]);
        let (level, logging) = cli.logging_settings();
        assert_eq!(level, "info");
        assert!(!logging.local_enabled);
    }
}
