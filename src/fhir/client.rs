//! Registry client
//!
//! [`FhirClient`] owns a [`Transport`] and the immutable [`ClientSettings`]
//! derived from configuration. It is the entry point for searches and for
//! walking paginated results.

use super::bundle::BundleResult;
use super::pagination::{PageState, Pages, PaginationResolver};
use super::query::{RequestDescriptor, SearchBuilder};
use super::transport::{HttpTransport, Transport};
use crate::config::RegistryConfig;
use crate::domain::ids::ResourceType;
use crate::domain::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Settings applied to every request the client builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Duration,
    /// `_count` for initial searches; `None` leaves the page size to the server
    pub entry_limit: Option<u32>,
}

impl ClientSettings {
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            entry_limit: Some(config.entry_limit).filter(|limit| *limit > 0),
        }
    }
}

/// FHIR registry client
///
/// # Example
///
/// ```no_run
/// use annuaire::config::RegistryConfig;
/// use annuaire::domain::ResourceType;
/// use annuaire::fhir::params::ParameterSet;
/// use annuaire::fhir::FhirClient;
///
/// # async fn example() -> annuaire::domain::Result<()> {
/// let client = FhirClient::from_config(&RegistryConfig::default())?;
/// let raw = client
///     .search(ResourceType::Practitioner)
///     .by_id("810002909371")
///     .and(ParameterSet::qualification_code("70"))
///     .return_raw()
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FhirClient {
    transport: Arc<dyn Transport>,
    settings: ClientSettings,
}

impl FhirClient {
    pub fn new(transport: Arc<dyn Transport>, settings: ClientSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Client over HTTPS, configured from the `[registry]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the HTTP transport cannot be built
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            Arc::new(transport),
            ClientSettings::from_config(config),
        ))
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Starts a search over `resource_type`
    pub fn search(&self, resource_type: ResourceType) -> SearchBuilder<'_> {
        SearchBuilder::new(self, resource_type)
    }

    /// Pagination resolver bound to this client's base URL and timeout
    pub fn resolver(&self) -> PaginationResolver {
        PaginationResolver::new(self.settings.base_url.clone(), self.settings.timeout)
    }

    /// Fetches the page following `bundle`, or `None` when it was the last
    ///
    /// # Errors
    ///
    /// Unsupported `next` links, transport and decode failures.
    pub async fn next_page(&self, bundle: &BundleResult) -> Result<Option<BundleResult>> {
        match self.resolver().resolve(bundle)? {
            PageState::Exhausted => Ok(None),
            PageState::HasMore(descriptor) => self.fetch_bundle(&descriptor).await.map(Some),
        }
    }

    /// Walks every page starting from `first`
    pub fn pages(&self, first: BundleResult) -> Pages<'_> {
        Pages::new(self, first)
    }

    /// Dispatches `descriptor` and decodes the body as a bundle
    ///
    /// # Errors
    ///
    /// Transport failures unmodified, [`crate::domain::FhirError::InvalidResponse`]
    /// for an undecodable body.
    pub async fn fetch_bundle(&self, descriptor: &RequestDescriptor) -> Result<BundleResult> {
        let body = self.fetch_raw(descriptor).await?;
        let bundle = BundleResult::from_slice(&body)?;
        tracing::debug!(
            bundle_id = %bundle.id,
            entries = bundle.entries.len(),
            has_next = bundle.next_link().is_some(),
            "Bundle decoded"
        );
        Ok(bundle)
    }

    /// Dispatches `descriptor` and returns the body untouched
    ///
    /// # Errors
    ///
    /// Transport failures unmodified.
    pub async fn fetch_raw(&self, descriptor: &RequestDescriptor) -> Result<Vec<u8>> {
        self.transport.get(descriptor).await
    }
}

impl fmt::Debug for FhirClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FhirClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
