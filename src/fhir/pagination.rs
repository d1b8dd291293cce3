//! Server-driven pagination
//!
//! The registry answers searches with one page and a `next` link. Two link
//! shapes are in use and they cannot be mixed:
//!
//! - **cursor**: `<base>/_page?id=<opaque>`; the continuation sends only
//!   the cursor id to the `_page` endpoint.
//! - **offset**: `<base>?_getpages=<token>&_pageId=<n>&_bundletype=searchset`;
//!   the continuation sends exactly those three values to the base URL. The
//!   original search filters are dropped because the server keeps them.
//!   `_getpages` and `_pageId` are required; a missing `_bundletype` is
//!   tolerated with a warning.
//!
//! A `next` link in any other shape is an error
//! ([`FhirError::UnsupportedPagination`]), never the end of the results.

use super::bundle::BundleResult;
use super::client::FhirClient;
use super::params::{keys, ParameterSet};
use super::query::{RequestDescriptor, ResultShape, SearchTarget, PAGE_ENDPOINT};
use crate::domain::{FhirError, Result};
use std::time::Duration;
use url::Url;

/// Whether another page can be fetched
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    /// The next page is obtained with this request
    HasMore(RequestDescriptor),
    /// No `next` link; terminal
    Exhausted,
}

/// Turns a bundle's `next` link into the request for the following page
#[derive(Debug, Clone)]
pub struct PaginationResolver {
    base_url: String,
    timeout: Duration,
}

impl PaginationResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Inspects the bundle's links
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::UnsupportedPagination`] when a `next` link is
    /// present but matches neither pagination scheme.
    pub fn resolve(&self, bundle: &BundleResult) -> Result<PageState> {
        match bundle.next_link() {
            None => Ok(PageState::Exhausted),
            Some(next) => self.continuation(next).map(PageState::HasMore),
        }
    }

    /// Builds the continuation request for a `next` link
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::UnsupportedPagination`] for unrecognized links.
    pub fn continuation(&self, next: &str) -> Result<RequestDescriptor> {
        let url = self.parse_link(next)?;

        let query_value = |name: &str| {
            url.query_pairs()
                .find(|(key, value)| key == name && !value.trim().is_empty())
                .map(|(_, value)| value.into_owned())
        };

        let is_page_endpoint = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            == Some(PAGE_ENDPOINT);

        if is_page_endpoint {
            if let Some(cursor) = query_value(keys::PAGE_CURSOR) {
                tracing::debug!(cursor = %cursor, "Next page uses cursor pagination");
                return Ok(self.descriptor(
                    SearchTarget::PageCursor,
                    ParameterSet::page_cursor(cursor),
                ));
            }
        }

        if let (Some(get_pages), Some(page_id)) =
            (query_value(keys::GET_PAGES), query_value(keys::PAGE_ID))
        {
            let bundle_type = query_value(keys::BUNDLE_TYPE);
            if bundle_type.is_none() {
                tracing::warn!(link = %next, "Offset link has no _bundletype");
            }
            tracing::debug!(
                get_pages = %get_pages,
                page_id = %page_id,
                "Next page uses offset pagination"
            );
            return Ok(self.descriptor(
                SearchTarget::Root,
                ParameterSet::offset_page(get_pages, Some(page_id), bundle_type),
            ));
        }

        Err(FhirError::UnsupportedPagination(next.to_string()).into())
    }

    fn parse_link(&self, next: &str) -> Result<Url> {
        let parsed = match Url::parse(next) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&self.base_url).and_then(|base| base.join(next))
            }
            Err(e) => Err(e),
        };
        parsed.map_err(|e| FhirError::UnsupportedPagination(format!("{next} ({e})")).into())
    }

    fn descriptor(&self, target: SearchTarget, params: ParameterSet) -> RequestDescriptor {
        RequestDescriptor {
            base_url: self.base_url.clone(),
            target,
            params,
            shape: ResultShape::Bundle,
            timeout: self.timeout,
        }
    }
}

enum Cursor {
    /// First page, not yet handed out
    Ready(Box<BundleResult>),
    HasMore(RequestDescriptor),
    /// The last page handed out had an unrecognized `next` link
    Unsupported(String),
    Exhausted,
}

/// Walks a result set page by page, starting from an initial search
///
/// Pages are fetched one at a time. Once exhausted, the cursor stays
/// exhausted; an unsupported `next` link is reported on every later call.
///
/// ```no_run
/// # use annuaire::fhir::FhirClient;
/// # use annuaire::fhir::bundle::BundleResult;
/// # async fn example(client: &FhirClient, first: BundleResult) -> annuaire::domain::Result<()> {
/// let mut pages = client.pages(first);
/// while let Some(page) = pages.next_page().await? {
///     println!("{} entries", page.entries.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Pages<'c> {
    client: &'c FhirClient,
    resolver: PaginationResolver,
    cursor: Cursor,
}

impl<'c> Pages<'c> {
    pub(crate) fn new(client: &'c FhirClient, first: BundleResult) -> Self {
        Self {
            client,
            resolver: client.resolver(),
            cursor: Cursor::Ready(Box::new(first)),
        }
    }

    /// Returns the next page, or `None` once the results are exhausted
    ///
    /// # Errors
    ///
    /// Transport and decode failures of the continuation request, and
    /// [`FhirError::UnsupportedPagination`] for an unrecognized `next` link.
    pub async fn next_page(&mut self) -> Result<Option<BundleResult>> {
        let bundle = match std::mem::replace(&mut self.cursor, Cursor::Exhausted) {
            Cursor::Exhausted => return Ok(None),
            Cursor::Unsupported(link) => {
                self.cursor = Cursor::Unsupported(link.clone());
                return Err(FhirError::UnsupportedPagination(link).into());
            }
            Cursor::Ready(bundle) => *bundle,
            Cursor::HasMore(descriptor) => match self.client.fetch_bundle(&descriptor).await {
                Ok(bundle) => bundle,
                Err(e) => {
                    self.cursor = Cursor::HasMore(descriptor);
                    return Err(e);
                }
            },
        };

        self.cursor = match self.resolver.resolve(&bundle) {
            Ok(PageState::HasMore(descriptor)) => Cursor::HasMore(descriptor),
            Ok(PageState::Exhausted) => Cursor::Exhausted,
            Err(e) => {
                tracing::error!(error = %e, "Cannot continue pagination");
                Cursor::Unsupported(bundle.next_link().unwrap_or_default().to_string())
            }
        };
        Ok(Some(bundle))
    }

    /// True once no further page will be returned
    pub fn is_exhausted(&self) -> bool {
        matches!(self.cursor, Cursor::Exhausted)
    }
}
