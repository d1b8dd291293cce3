//! Harvest coordinator - drives the practitioner harvest
//!
//! The harvest searches organizations by postal code, asking the registry to
//! embed the practitioner roles that reference them. For every page:
//!
//! 1. Organizations are indexed by id
//! 2. Each practitioner role is matched to its organization
//! 3. The role's practitioner is looked up by id, restricted to the
//!    configured qualification code
//! 4. Identity and contact fields are extracted from the raw lookup, the
//!    organization address is resolved, and a record is emitted
//!
//! Roles that cannot produce a record are counted per [`SkipReason`] and the
//! run continues. Transport failures and unsupported pagination stop it; once
//! the first page is in, the records built so far are kept and the error is
//! reported in [`HarvestReport::failure`].

use crate::config::{AnnuaireConfig, HarvestConfig};
use crate::core::harvest::summary::{HarvestReport, SkipReason};
use crate::domain::ids::ResourceType;
use crate::domain::{AnnuaireError, PractitionerRecord, Result};
use crate::fhir::address::AddressResolver;
use crate::fhir::bundle::{count_entries, BundleResult, Entry, Resource};
use crate::fhir::extract::FieldExtractor;
use crate::fhir::params::ParameterSet;
use crate::fhir::FhirClient;
use crate::{log_entry_skipped, log_page_loaded};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::watch;

enum RoleOutcome {
    Record(Box<PractitionerRecord>),
    Skipped(SkipReason),
}

/// Harvest coordinator
pub struct HarvestCoordinator {
    client: FhirClient,
    config: HarvestConfig,
    extractor: FieldExtractor,
    resolver: AddressResolver,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl HarvestCoordinator {
    /// Create a coordinator over an existing client
    pub fn new(
        client: FhirClient,
        config: HarvestConfig,
        identifier_system: impl Into<String>,
    ) -> Self {
        Self {
            client,
            config,
            extractor: FieldExtractor::new(identifier_system),
            resolver: AddressResolver::new(),
            shutdown_signal: None,
        }
    }

    /// Create a coordinator talking HTTPS to the configured registry
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the HTTP client cannot be built
    pub fn from_config(config: &AnnuaireConfig) -> Result<Self> {
        let client = FhirClient::from_config(&config.registry)?;
        Ok(Self::new(
            client,
            config.harvest.clone(),
            config.registry.identifier_system.clone(),
        ))
    }

    /// Stop after the current page once `signal` turns true
    pub fn with_shutdown_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .map(|signal| *signal.borrow())
            .unwrap_or(false)
    }

    /// Execute the harvest
    ///
    /// # Errors
    ///
    /// Fails only when the initial organization search fails. Later
    /// transport, decode and pagination failures stop the walk and are
    /// returned in the report next to the partial results.
    pub async fn execute_harvest(&self) -> Result<HarvestReport> {
        let start_time = Instant::now();
        let mut report = HarvestReport::default();

        tracing::info!(
            postal_codes = ?self.config.postal_codes,
            qualification_code = %self.config.qualification_code,
            "Starting harvest"
        );

        let first = self.search_organizations().await?;
        tracing::info!(entries = first.entries.len(), "Initial search returned");

        let mut pages = self.client.pages(first);
        loop {
            let page = match pages.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => {
                    report.halt(e);
                    break;
                }
            };

            if let Err(e) = self.process_page(&page, &mut report).await {
                report.halt(e);
                break;
            }

            if self.config.max_pages == Some(report.summary.pages) && !pages.is_exhausted() {
                tracing::warn!(max_pages = report.summary.pages, "Page cap reached");
                report.summary.truncated = true;
                break;
            }

            if self.shutdown_requested() {
                tracing::warn!(
                    pages = report.summary.pages,
                    "Shutdown requested, stopping after current page"
                );
                report.summary.interrupted = true;
                break;
            }
        }

        report.summary = report.summary.with_duration(start_time.elapsed());
        report.summary.log_summary();
        Ok(report)
    }

    /// Organizations in any configured postal code, with their roles embedded
    async fn search_organizations(&self) -> Result<BundleResult> {
        let mut codes = self.config.postal_codes.iter();
        let mut search = self.client.search(ResourceType::Organization);
        if let Some(first) = codes.next() {
            search = search.filter(ParameterSet::postal_code_contains(first.as_str()));
        }
        for code in codes {
            search = search.or(ParameterSet::postal_code_contains(code.as_str()));
        }

        search
            .rev_include(self.config.rev_include.as_str())
            .return_bundle()
            .execute()
            .await
    }

    async fn process_page(&self, page: &BundleResult, report: &mut HarvestReport) -> Result<()> {
        let organizations: HashMap<&str, &Resource> = page
            .entries_of(ResourceType::Organization)
            .filter_map(|entry| Some((entry.id()?, &entry.resource)))
            .collect();
        let roles: Vec<&Entry> = page.entries_of(ResourceType::PractitionerRole).collect();

        let summary = &mut report.summary;
        summary.pages += 1;
        summary.organizations += organizations.len();
        summary.roles += roles.len();
        log_page_loaded!(summary.pages, organizations.len(), roles.len());

        for role in roles {
            match self.process_role(role, &organizations).await? {
                RoleOutcome::Record(record) => {
                    report.records.push(*record);
                    report.summary.records += 1;
                }
                RoleOutcome::Skipped(reason) => report.summary.record_skip(reason),
            }
        }
        Ok(())
    }

    async fn process_role(
        &self,
        role: &Entry,
        organizations: &HashMap<&str, &Resource>,
    ) -> Result<RoleOutcome> {
        let role_id = role.id().unwrap_or_default();

        let organization_id = role.resource.organization_reference();
        let Some((organization_id, organization)) = organization_id
            .and_then(|id| organizations.get(id).map(|organization| (id, *organization)))
        else {
            log_entry_skipped!(
                role_id,
                SkipReason::MissingOrganization,
                organization_id.unwrap_or_default()
            );
            return Ok(RoleOutcome::Skipped(SkipReason::MissingOrganization));
        };

        let Some(practitioner_id) = role.resource.practitioner_reference() else {
            log_entry_skipped!(role_id, SkipReason::MissingPractitionerReference, "");
            return Ok(RoleOutcome::Skipped(
                SkipReason::MissingPractitionerReference,
            ));
        };

        let raw = self
            .client
            .search(ResourceType::Practitioner)
            .by_id(practitioner_id)
            .and(ParameterSet::qualification_code(
                self.config.qualification_code.as_str(),
            ))
            .return_raw()
            .execute()
            .await?;

        match count_entries(&raw) {
            Err(e) => {
                tracing::warn!(
                    role_id = %role_id,
                    practitioner_id = %practitioner_id,
                    error = %e,
                    "Cannot parse practitioner lookup"
                );
                return Ok(RoleOutcome::Skipped(SkipReason::UndecodableLookup));
            }
            Ok(0) => {
                tracing::debug!(
                    practitioner_id = %practitioner_id,
                    "Practitioner lacks the requested qualification"
                );
                return Ok(RoleOutcome::Skipped(SkipReason::NoQualification));
            }
            Ok(_) => {}
        }

        let fields = self.extractor.extract(&raw);
        if fields.identifier.is_empty() {
            tracing::debug!(practitioner_id = %practitioner_id, "Practitioner has no registry identifier");
            return Ok(RoleOutcome::Skipped(SkipReason::MissingIdentifier));
        }

        let address = self
            .resolver
            .resolve(organization.addresses())
            .unwrap_or_default();

        let record = PractitionerRecord::builder()
            .identifier(fields.identifier)
            .first_name(fields.given_names)
            .last_name(fields.family_name)
            .phone(fields.phone)
            .email(fields.email)
            .organization_id(organization_id)
            .organization_name(organization.name().unwrap_or_default())
            .address(address.line)
            .city(address.city)
            .zipcode(address.zipcode)
            .region(address.region.label())
            .build()
            .map_err(AnnuaireError::Other)?;

        tracing::debug!(
            identifier = %record.identifier,
            organization_id = %record.organization_id,
            region = %record.region,
            "Record assembled"
        );
        Ok(RoleOutcome::Record(Box::new(record)))
    }
}
