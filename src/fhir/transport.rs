//! Request dispatch
//!
//! [`Transport`] is the seam between request construction and the network:
//! it takes a finalized [`RequestDescriptor`] and returns the raw response
//! body. [`HttpTransport`] talks to the registry over HTTPS with reqwest;
//! [`MemoryTransport`] serves canned bodies for tests and offline runs.
//!
//! Transports never retry. A failed dispatch is returned to the caller as is.

use super::query::RequestDescriptor;
use crate::config::RegistryConfig;
use crate::domain::{AnnuaireError, FhirError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Media type requested from the registry
pub const FHIR_JSON: &str = "application/fhir+json";

/// Executes GET requests against the registry
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatches the request and returns the response body
    ///
    /// # Errors
    ///
    /// - [`FhirError::ConnectionFailed`] when the server cannot be reached
    /// - [`FhirError::Timeout`] when the descriptor timeout elapses
    /// - [`FhirError::RequestFailed`] for any non-2xx status
    async fn get(&self, descriptor: &RequestDescriptor) -> Result<Vec<u8>>;
}

/// reqwest-backed transport
///
/// # Example
///
/// ```no_run
/// use annuaire::config::RegistryConfig;
/// use annuaire::fhir::transport::HttpTransport;
///
/// # fn example() -> annuaire::domain::Result<()> {
/// let transport = HttpTransport::new(&RegistryConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub struct HttpTransport {
    client: Client,
    api_key: Option<(HeaderName, HeaderValue)>,
}

impl HttpTransport {
    /// Builds the HTTP client and the API key header from the registry
    /// configuration
    ///
    /// # Errors
    ///
    /// Returns [`AnnuaireError::Configuration`] when the header name or value
    /// is not valid HTTP, or the client cannot be built.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AnnuaireError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        let api_key = match &config.api_key {
            Some(key) if !key.expose_secret().is_blank() => {
                let name = HeaderName::from_bytes(config.api_key_header.trim().as_bytes())
                    .map_err(|e| {
                        AnnuaireError::Configuration(format!(
                            "Invalid api_key_header '{}': {e}",
                            config.api_key_header
                        ))
                    })?;
                let mut value = HeaderValue::from_str(key.expose_secret().as_str()).map_err(
                    |_| AnnuaireError::Configuration("API key is not a valid header value".into()),
                )?;
                value.set_sensitive(true);
                Some((name, value))
            }
            _ => {
                tracing::warn!("No registry API key configured, sending anonymous requests");
                None
            }
        };

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, descriptor: &RequestDescriptor) -> Result<Vec<u8>> {
        let url = descriptor.url()?;
        tracing::debug!(url = %url, timeout_secs = descriptor.timeout.as_secs(), "GET");

        let mut request = self
            .client
            .get(url.clone())
            .timeout(descriptor.timeout)
            .header(ACCEPT, FHIR_JSON);
        if let Some((name, value)) = &self.api_key {
            request = request.header(name.clone(), value.clone());
        }

        let response = request.send().await.map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(url = %url, status = status.as_u16(), "Registry request failed");
            return Err(FhirError::RequestFailed {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response.bytes().await.map_err(send_error)?;
        Ok(body.to_vec())
    }
}

fn send_error(e: reqwest::Error) -> AnnuaireError {
    if e.is_timeout() {
        FhirError::Timeout(e.to_string()).into()
    } else {
        FhirError::ConnectionFailed(e.to_string()).into()
    }
}

enum Canned {
    Body(Vec<u8>),
    Status(u16, String),
}

/// In-memory transport serving canned responses keyed by full request URL
///
/// Unknown URLs answer 404. Every dispatched URL is recorded in order.
///
/// ```
/// use annuaire::fhir::transport::MemoryTransport;
///
/// let transport = MemoryTransport::new()
///     .with_response("https://registry.example/Organization", r#"{"resourceType":"Bundle"}"#)
///     .with_status("https://registry.example/_page?id=gone", 410, "expired");
/// assert!(transport.requests().is_empty());
/// ```
#[derive(Default)]
pub struct MemoryTransport {
    responses: HashMap<String, Canned>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `url` with `body`
    pub fn with_response(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), Canned::Body(body.into()));
        self
    }

    /// Answers `url` with a non-2xx status
    pub fn with_status(
        mut self,
        url: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        self.responses
            .insert(url.into(), Canned::Status(status, message.into()));
        self
    }

    /// URLs dispatched so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, descriptor: &RequestDescriptor) -> Result<Vec<u8>> {
        let url = descriptor.url()?.to_string();
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.clone());

        match self.responses.get(&url) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Status(status, message)) => Err(FhirError::RequestFailed {
                status: *status,
                message: message.clone(),
            }
            .into()),
            None => Err(FhirError::RequestFailed {
                status: 404,
                message: format!("no canned response for {url}"),
            }
            .into()),
        }
    }
}
