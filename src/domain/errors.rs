//! Domain error types
//!
//! This module defines the error hierarchy for Annuaire.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Annuaire error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum AnnuaireError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// FHIR registry errors (transport, decoding, pagination)
    #[error("FHIR error: {0}")]
    Fhir(#[from] FhirError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// FHIR registry errors
///
/// Errors that occur when talking to the registry or interpreting its
/// responses. These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum FhirError {
    /// Failed to reach the registry
    #[error("Failed to connect to FHIR server: {0}")]
    ConnectionFailed(String),

    /// The request exceeded its configured timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The server answered with a non-2xx status
    #[error("Request failed: {status} - {message}")]
    RequestFailed { status: u16, message: String },

    /// The response body could not be decoded as a bundle
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// A `next` link that matches none of the known pagination schemes
    #[error("Unsupported pagination format: {0}")]
    UnsupportedPagination(String),

    /// A URL (base or link) could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FhirError {
    /// Whether the error came from the transport layer rather than from
    /// interpreting a response
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FhirError::ConnectionFailed(_) | FhirError::Timeout(_) | FhirError::RequestFailed { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for AnnuaireError {
    fn from(err: std::io::Error) -> Self {
        AnnuaireError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AnnuaireError {
    fn from(err: serde_json::Error) -> Self {
        AnnuaireError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AnnuaireError {
    fn from(err: toml::de::Error) -> Self {
        AnnuaireError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annuaire_error_display() {
        let err = AnnuaireError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_fhir_error_conversion() {
        let fhir_err = FhirError::ConnectionFailed("Network error".to_string());
        let err: AnnuaireError = fhir_err.into();
        assert!(matches!(err, AnnuaireError::Fhir(_)));
    }

    #[test]
    fn test_request_failed_display() {
        let err = FhirError::RequestFailed {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed: 503 - unavailable");
        assert!(err.is_transport());
    }

    #[test]
    fn test_unsupported_pagination_is_not_transport() {
        let err = FhirError::UnsupportedPagination("https://x/next".to_string());
        assert!(!err.is_transport());
        assert!(err.to_string().contains("Unsupported pagination format"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AnnuaireError = io_err.into();
        assert!(matches!(err, AnnuaireError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: AnnuaireError = json_err.into();
        assert!(matches!(err, AnnuaireError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: AnnuaireError = toml_err.into();
        assert!(matches!(err, AnnuaireError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
