//! FHIR registry client
//!
//! This module contains everything needed to query the healthcare registry:
//!
//! - [`params`]: search filters and their merge operators
//! - [`query`]: fluent search construction and request descriptors
//! - [`bundle`]: decoding of search result pages
//! - [`pagination`]: continuation across the two server pagination schemes
//! - [`extract`]: best-effort field extraction from raw payloads
//! - [`address`]: canonical addresses from organization address arrays
//! - [`transport`]: request dispatch (HTTP or in-memory)
//! - [`client`]: the client tying the pieces together

pub mod address;
pub mod bundle;
pub mod client;
pub mod extract;
pub mod pagination;
pub mod params;
pub mod query;
pub mod transport;

pub use address::{Address, AddressResolver, Region};
pub use bundle::{BundleResult, Entry, Resource};
pub use client::{ClientSettings, FhirClient};
pub use extract::{ExtractedFields, FieldExtractor};
pub use pagination::{PageState, Pages, PaginationResolver};
pub use params::ParameterSet;
pub use query::{RequestDescriptor, SearchBuilder};
pub use transport::{HttpTransport, MemoryTransport, Transport};
