//! Result type alias for Annuaire
//!
//! This module provides a convenient Result type alias that uses AnnuaireError
//! as the error type.

use super::errors::AnnuaireError;

/// Result type alias for Annuaire operations
///
/// # Examples
///
/// ```
/// use annuaire::domain::result::Result;
/// use annuaire::domain::errors::AnnuaireError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(AnnuaireError::Other("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AnnuaireError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{AnnuaireError, FhirError};

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_fhir_error_converts_into_annuaire_error() {
        fn inner() -> Result<()> {
            Err(FhirError::Timeout("30s".to_string()).into())
        }

        assert!(matches!(inner(), Err(AnnuaireError::Fhir(FhirError::Timeout(_)))));
    }
}
