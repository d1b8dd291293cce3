//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output
//! - JSON-formatted file logs with rotation
//! - Configurable log levels, overridable through `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use annuaire::logging::init_logging;
//! use annuaire::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a loaded search result page
///
/// # Example
///
/// ```no_run
/// use annuaire::log_page_loaded;
///
/// log_page_loaded!(1, 12, 30);
/// ```
#[macro_export]
macro_rules! log_page_loaded {
    ($page:expr, $organizations:expr, $roles:expr) => {
        tracing::info!(
            page = $page,
            organizations = $organizations,
            roles = $roles,
            "Page loaded"
        );
    };
}

/// Log a practitioner role that cannot be linked to its resources
///
/// # Example
///
/// ```no_run
/// use annuaire::log_entry_skipped;
///
/// log_entry_skipped!("role-1", "missing_organization", "org-9");
/// ```
#[macro_export]
macro_rules! log_entry_skipped {
    ($role_id:expr, $reason:expr, $reference:expr) => {
        tracing::warn!(
            role_id = %$role_id,
            reason = %$reason,
            reference = %$reference,
            "Skipping practitioner role"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use annuaire::log_error_with_context;
/// use annuaire::domain::AnnuaireError;
///
/// let error = AnnuaireError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::AnnuaireError;

    #[test]
    fn test_macros_expand_without_subscriber() {
        log_page_loaded!(1usize, 2usize, 3usize);
        log_entry_skipped!("r1", "missing_organization", "o1");
        log_error_with_context!(AnnuaireError::Other("x".into()), "test");
    }
}
