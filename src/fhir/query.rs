//! Fluent search construction
//!
//! [`SearchBuilder`] accumulates [`ParameterSet`]s for one search and
//! finalizes them into a [`RequestDescriptor`]. The decode mode is chosen
//! with [`SearchBuilder::return_bundle`] or [`SearchBuilder::return_raw`],
//! which fixes the type `execute` returns.
//!
//! ```no_run
//! use annuaire::domain::ResourceType;
//! use annuaire::fhir::params::ParameterSet;
//! use annuaire::fhir::FhirClient;
//!
//! # async fn example(client: &FhirClient) -> annuaire::domain::Result<()> {
//! let bundle = client
//!     .search(ResourceType::Organization)
//!     .filter(ParameterSet::postal_code_contains("974"))
//!     .or(ParameterSet::postal_code_contains("976"))
//!     .rev_include("PractitionerRole:organization")
//!     .return_bundle()
//!     .execute()
//!     .await?;
//! println!("{} entries", bundle.entries.len());
//! # Ok(())
//! # }
//! ```

use super::bundle::BundleResult;
use super::client::FhirClient;
use super::params::ParameterSet;
use crate::domain::ids::ResourceType;
use crate::domain::{FhirError, Result};
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

/// Path segment of the cursor pagination endpoint
pub const PAGE_ENDPOINT: &str = "_page";

/// What a request addresses, relative to the registry base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    /// `<base>/<ResourceType>`
    Resource(ResourceType),
    /// `<base>/_page`
    PageCursor,
    /// `<base>/`
    Root,
}

impl SearchTarget {
    /// Path segment appended to the base URL
    pub fn path(&self) -> &'static str {
        match self {
            SearchTarget::Resource(rt) => rt.as_str(),
            SearchTarget::PageCursor => PAGE_ENDPOINT,
            SearchTarget::Root => "",
        }
    }
}

/// How the response body is handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Decoded into a [`BundleResult`]
    Bundle,
    /// Raw bytes for ad-hoc extraction
    Raw,
}

/// A finalized request, never mutated after dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub base_url: String,
    pub target: SearchTarget,
    pub params: ParameterSet,
    pub shape: ResultShape,
    pub timeout: Duration,
}

impl RequestDescriptor {
    /// Full request URL: base, target path and serialized parameters
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidUrl`] when the base URL cannot carry a path
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FhirError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|_| FhirError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push(self.target.path());

        let pairs = self.params.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

/// Marker for requests decoded into a [`BundleResult`]
#[derive(Debug)]
pub struct BundleMode;

/// Marker for requests returning raw bytes
#[derive(Debug)]
pub struct RawMode;

/// Fluent accumulation of search filters for one resource type
#[derive(Debug)]
pub struct SearchBuilder<'c> {
    client: &'c FhirClient,
    target: SearchTarget,
    params: ParameterSet,
}

impl<'c> SearchBuilder<'c> {
    pub(crate) fn new(client: &'c FhirClient, resource_type: ResourceType) -> Self {
        Self {
            client,
            target: SearchTarget::Resource(resource_type),
            params: ParameterSet::new(),
        }
    }

    /// Seeds the search with `params`, keeping anything set earlier
    pub fn filter(mut self, params: ParameterSet) -> Self {
        self.params = self.params.union(params.clone()).intersect(params);
        self
    }

    /// Narrows the search (intersection)
    pub fn and(mut self, params: ParameterSet) -> Self {
        self.params = self.params.intersect(params);
        self
    }

    /// Widens the search (union)
    pub fn or(mut self, params: ParameterSet) -> Self {
        self.params = self.params.union(params);
        self
    }

    /// Asks the server to embed resources referencing the results
    pub fn rev_include(mut self, directive: impl Into<String>) -> Self {
        self.params = self.params.intersect(ParameterSet::rev_include(directive));
        self
    }

    /// Restricts the search to one logical id; combines with other filters
    pub fn by_id(mut self, id: impl Into<String>) -> Self {
        self.params = self.params.intersect(ParameterSet::id(id));
        self
    }

    /// Current accumulated parameters
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Decode the response into a [`BundleResult`]
    pub fn return_bundle(self) -> PreparedRequest<'c, BundleMode> {
        self.prepare(ResultShape::Bundle)
    }

    /// Hand back the raw response bytes
    pub fn return_raw(self) -> PreparedRequest<'c, RawMode> {
        self.prepare(ResultShape::Raw)
    }

    fn prepare<M>(self, shape: ResultShape) -> PreparedRequest<'c, M> {
        let settings = self.client.settings();
        let mut params = self.params;
        if params.count.is_none() {
            params.count = settings.entry_limit.filter(|limit| *limit > 0);
        }

        PreparedRequest {
            client: self.client,
            descriptor: RequestDescriptor {
                base_url: settings.base_url.clone(),
                target: self.target,
                params,
                shape,
                timeout: settings.timeout,
            },
            mode: PhantomData,
        }
    }
}

/// A finalized search ready for dispatch
#[derive(Debug)]
pub struct PreparedRequest<'c, M> {
    client: &'c FhirClient,
    descriptor: RequestDescriptor,
    mode: PhantomData<M>,
}

impl<M> PreparedRequest<'_, M> {
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }
}

impl PreparedRequest<'_, BundleMode> {
    /// Dispatches the request and decodes the bundle
    ///
    /// # Errors
    ///
    /// Transport failures are returned unmodified; an undecodable body is
    /// [`FhirError::InvalidResponse`].
    pub async fn execute(self) -> Result<BundleResult> {
        self.client.fetch_bundle(&self.descriptor).await
    }
}

impl PreparedRequest<'_, RawMode> {
    /// Dispatches the request and returns the body untouched
    ///
    /// # Errors
    ///
    /// Transport failures are returned unmodified.
    pub async fn execute(self) -> Result<Vec<u8>> {
        self.client.fetch_raw(&self.descriptor).await
    }
}
