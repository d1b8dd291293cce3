//! Harvest command implementation
//!
//! This module implements the `harvest` command, which walks the registry
//! for qualified practitioners and prints the resulting records.

use super::{EXIT_CONFIG, EXIT_CONNECTION, EXIT_FATAL, EXIT_INTERRUPTED, EXIT_SUCCESS};
use crate::config::{load_config, AnnuaireConfig};
use crate::core::harvest::{HarvestCoordinator, HarvestReport};
use crate::domain::{AnnuaireError, PractitionerRecord};
use crate::log_error_with_context;
use clap::{Args, ValueEnum};
use tokio::sync::watch;

/// How harvested records are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One aligned line per record, followed by the summary
    #[default]
    Table,
    /// A JSON array of records on stdout
    Json,
}

/// Arguments for the harvest command
#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Override postal code prefix(es) to search (comma-separated)
    #[arg(long)]
    pub postal_code: Option<String>,

    /// Override the practitioner qualification code
    #[arg(long)]
    pub qualification_code: Option<String>,

    /// Stop after this many result pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

impl HarvestArgs {
    /// Execute the harvest command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting harvest command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let coordinator = match HarvestCoordinator::from_config(&config) {
            Ok(c) => c.with_shutdown_signal(shutdown_signal),
            Err(e) => {
                log_error_with_context!(&e, "Failed to create harvest coordinator");
                eprintln!("Failed to initialize harvest: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let report = match coordinator.execute_harvest().await {
            Ok(report) => report,
            Err(e) => {
                log_error_with_context!(&e, "Harvest failed");
                eprintln!("Harvest failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.records)?),
            OutputFormat::Table => print_table(&report),
        }

        if let Some(e) = &report.failure {
            log_error_with_context!(e, "Harvest stopped early");
            eprintln!(
                "Harvest stopped after {} page(s): {e}; {} record(s) printed above.",
                report.summary.pages,
                report.records.len()
            );
            return Ok(exit_code_for(e));
        }

        if report.summary.interrupted {
            eprintln!("Harvest interrupted; results are partial.");
            tracing::info!("Harvest interrupted by user signal");
            return Ok(EXIT_INTERRUPTED);
        }
        if report.summary.truncated {
            eprintln!(
                "Stopped after {} page(s); more results are available.",
                report.summary.pages
            );
        }

        Ok(EXIT_SUCCESS)
    }

    fn apply_overrides(&self, config: &mut AnnuaireConfig) {
        if let Some(codes) = &self.postal_code {
            let codes: Vec<String> = codes
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            tracing::info!(postal_codes = ?codes, "Overriding postal codes from CLI");
            config.harvest.postal_codes = codes;
        }

        if let Some(code) = &self.qualification_code {
            tracing::info!(qualification_code = %code, "Overriding qualification code from CLI");
            config.harvest.qualification_code = code.clone();
        }

        if let Some(max_pages) = self.max_pages {
            tracing::info!(max_pages, "Overriding page cap from CLI");
            config.harvest.max_pages = Some(max_pages);
        }
    }
}

/// Exit code for an error that aborted the harvest
pub fn exit_code_for(error: &AnnuaireError) -> i32 {
    match error {
        AnnuaireError::Configuration(_) => EXIT_CONFIG,
        AnnuaireError::Fhir(e) if e.is_transport() => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

fn print_table(report: &HarvestReport) {
    for record in &report.records {
        println!("{}", table_row(record));
    }

    let summary = &report.summary;
    println!();
    println!("Harvest Summary:");
    println!("  Pages: {}", summary.pages);
    println!("  Organizations: {}", summary.organizations);
    println!("  Practitioner roles: {}", summary.roles);
    println!("  Records: {}", summary.records);
    println!("  Skipped: {}", summary.total_skipped());
    for (reason, count) in &summary.skipped {
        println!("    {reason}: {count}");
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
}

fn table_row(record: &PractitionerRecord) -> String {
    format!(
        "{:<12} {:<20} {:<20} {:<14} {:<30} {:<30} {:05} {:<20} {}",
        record.identifier,
        record.first_name,
        record.last_name,
        record.phone,
        record.email,
        record.organization_name,
        record.zipcode,
        record.city,
        record.region
    )
}
