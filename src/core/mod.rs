//! Core business logic for Annuaire.
//!
//! # Modules
//!
//! - [`harvest`] - Harvest orchestration over the registry client
//!
//! # Harvest Workflow
//!
//! 1. **Search**: Organizations by postal code, practitioner roles embedded
//! 2. **Paginate**: Follow `next` links across both server schemes
//! 3. **Look up**: Each role's practitioner, restricted to a qualification
//! 4. **Extract**: Identity, contact and address fields
//! 5. **Report**: Records plus a per-reason skip summary
//!
//! # Example
//!
//! ```rust,no_run
//! use annuaire::config::load_config;
//! use annuaire::core::harvest::HarvestCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("annuaire.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = HarvestCoordinator::from_config(&config)?.with_shutdown_signal(shutdown_rx);
//! let report = coordinator.execute_harvest().await?;
//!
//! println!("Records: {}", report.summary.records);
//! println!("Skipped: {}", report.summary.total_skipped());
//! # Ok(())
//! # }
//! ```

pub mod harvest;
