// Annuaire - FHIR Healthcare Directory Client
// Copyright (c) 2025 Annuaire Contributors
// Licensed under the MIT License

//! # Annuaire - FHIR Healthcare Directory Client
//!
//! Annuaire queries a FHIR healthcare registry for organizations and the
//! practitioners working there, and assembles flat practitioner records.
//!
//! ## Overview
//!
//! This library provides:
//! - **Composable searches** built from parameter sets merged with AND/OR
//! - **Pagination** across the registry's cursor and offset link schemes
//! - **Field extraction** that tolerates partial or malformed payloads
//! - **Address resolution** from organization address extensions
//! - **Harvest orchestration** tying the above together
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Harvest orchestration
//! - [`fhir`] - Registry client, searches, pagination and extraction
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annuaire::config::load_config;
//! use annuaire::core::harvest::HarvestCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("annuaire.toml")?;
//!     let report = HarvestCoordinator::from_config(&config)?
//!         .execute_harvest()
//!         .await?;
//!
//!     for record in &report.records {
//!         println!("{} {} ({})", record.first_name, record.last_name, record.region);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Searching
//!
//! ```rust,no_run
//! use annuaire::config::RegistryConfig;
//! use annuaire::domain::ResourceType;
//! use annuaire::fhir::{FhirClient, ParameterSet};
//!
//! # async fn example() -> annuaire::domain::Result<()> {
//! let client = FhirClient::from_config(&RegistryConfig::default())?;
//! let first = client
//!     .search(ResourceType::Organization)
//!     .filter(ParameterSet::postal_code_contains("974"))
//!     .or(ParameterSet::postal_code_contains("976"))
//!     .return_bundle()
//!     .execute()
//!     .await?;
//!
//! let mut pages = client.pages(first);
//! while let Some(page) = pages.next_page().await? {
//!     println!("{} entries", page.entries.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Annuaire uses [`domain::AnnuaireError`] for all errors. Registry failures
//! are wrapped as [`domain::FhirError`] and are never retried by the library.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod fhir;
pub mod logging;
