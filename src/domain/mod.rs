//! Domain models and types for Annuaire.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`ResourceType`], [`Reference`])
//! - **Output records** ([`PractitionerRecord`])
//! - **Error types** ([`AnnuaireError`], [`FhirError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, AnnuaireError>`]:
//!
//! ```rust
//! use annuaire::domain::{AnnuaireError, FhirError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(FhirError::UnsupportedPagination("https://host/next".into()))?;
//!     Ok(())
//! }
//!
//! assert!(matches!(example(), Err(AnnuaireError::Fhir(_))));
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{AnnuaireError, FhirError};
pub use ids::{Reference, ResourceType};
pub use record::{PractitionerRecord, PractitionerRecordBuilder};
pub use result::Result;
