//! Domain identifier types with validation
//!
//! This module provides the resource type names the client searches on and
//! the `"<ResourceType>/<id>"` reference strings found in resource payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FHIR resource types the client knows how to search
///
/// # Examples
///
/// ```
/// use annuaire::domain::ids::ResourceType;
/// use std::str::FromStr;
///
/// let rt = ResourceType::from_str("PractitionerRole").unwrap();
/// assert_eq!(rt.as_str(), "PractitionerRole");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Organization,
    Practitioner,
    PractitionerRole,
}

impl ResourceType {
    /// Returns the FHIR name of the resource type
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Organization => "Organization",
            ResourceType::Practitioner => "Practitioner",
            ResourceType::PractitionerRole => "PractitionerRole",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Organization" => Ok(ResourceType::Organization),
            "Practitioner" => Ok(ResourceType::Practitioner),
            "PractitionerRole" => Ok(ResourceType::PractitionerRole),
            other => Err(format!("Unknown resource type: {other}")),
        }
    }
}

/// Reference string newtype wrapper
///
/// Holds a relative FHIR reference such as `"Organization/abc123"`.
/// The opaque id is only handed out once the prefix has been checked
/// against the resource type the caller expects.
///
/// # Examples
///
/// ```
/// use annuaire::domain::ids::{Reference, ResourceType};
///
/// let reference = Reference::new("Organization/abc123");
/// assert_eq!(reference.id_for(ResourceType::Organization), Some("abc123"));
/// assert_eq!(reference.id_for(ResourceType::Practitioner), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    /// Creates a new Reference from a string
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the opaque id when the reference points at `expected`
    ///
    /// The prefix must be exactly `"<expected>/"` and the remaining id must
    /// be non-empty. Any other shape (different type, absolute URL, missing
    /// separator) yields `None`.
    pub fn id_for(&self, expected: ResourceType) -> Option<&str> {
        let id = self
            .0
            .strip_prefix(expected.as_str())?
            .strip_prefix('/')?;
        if id.is_empty() || id.contains('/') {
            return None;
        }
        Some(id)
    }

    /// Returns the resource type named by the reference prefix, if known
    pub fn resource_type(&self) -> Option<ResourceType> {
        let (prefix, _) = self.0.split_once('/')?;
        ResourceType::from_str(prefix).ok()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Reference {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Reference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_round_trip() {
        for rt in [
            ResourceType::Organization,
            ResourceType::Practitioner,
            ResourceType::PractitionerRole,
        ] {
            assert_eq!(ResourceType::from_str(rt.as_str()).unwrap(), rt);
        }
        assert!(ResourceType::from_str("Patient").is_err());
    }

    #[test]
    fn test_reference_strips_matching_prefix() {
        let org = Reference::new("Organization/abc123");
        assert_eq!(org.id_for(ResourceType::Organization), Some("abc123"));

        let practitioner = Reference::new("Practitioner/xyz");
        assert_eq!(practitioner.id_for(ResourceType::Practitioner), Some("xyz"));
    }

    #[test]
    fn test_reference_rejects_other_resource_type() {
        let reference = Reference::new("Practitioner/xyz");
        assert_eq!(reference.id_for(ResourceType::Organization), None);
        // "Practitioner" is a prefix of "PractitionerRole" but not a match
        let role = Reference::new("PractitionerRole/r1");
        assert_eq!(role.id_for(ResourceType::Practitioner), None);
    }

    #[test]
    fn test_reference_rejects_malformed_values() {
        assert_eq!(Reference::new("").id_for(ResourceType::Organization), None);
        assert_eq!(
            Reference::new("Organization/").id_for(ResourceType::Organization),
            None
        );
        assert_eq!(
            Reference::new("Organizationabc").id_for(ResourceType::Organization),
            None
        );
        assert_eq!(
            Reference::new("https://host/fhir/Organization/abc").id_for(ResourceType::Organization),
            None
        );
    }

    #[test]
    fn test_reference_resource_type() {
        assert_eq!(
            Reference::new("PractitionerRole/r1").resource_type(),
            Some(ResourceType::PractitionerRole)
        );
        assert_eq!(Reference::new("Patient/p1").resource_type(), None);
        assert_eq!(Reference::new("nothing").resource_type(), None);
    }

    #[test]
    fn test_reference_deserializes_transparently() {
        let reference: Reference = serde_json::from_str("\"Organization/o1\"").unwrap();
        assert_eq!(reference.as_str(), "Organization/o1");
    }
}
