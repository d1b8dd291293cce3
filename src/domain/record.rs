//! Practitioner record domain model
//!
//! The in-memory output of a harvest: one record per practitioner role whose
//! practitioner passed the qualification filter and carries a registry
//! identifier. Writing records anywhere (CSV, storage) is left to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A practitioner working at an organization, with the organization's address
///
/// # Examples
///
/// ```
/// use annuaire::domain::record::PractitionerRecord;
///
/// let record = PractitionerRecord::builder()
///     .identifier("10001234567")
///     .organization_id("org-1")
///     .first_name("Jean")
///     .last_name("Dupont")
///     .region("Mayotte")
///     .build()
///     .unwrap();
/// assert_eq!(record.identifier, "10001234567");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PractitionerRecord {
    /// National registry identifier of the practitioner
    pub identifier: String,

    /// Given name(s), title-cased
    pub first_name: String,

    /// Family name, title-cased
    pub last_name: String,

    /// Phone number without internal whitespace
    pub phone: String,

    /// Lower-cased email address
    pub email: String,

    /// Organization logical id
    pub organization_id: String,

    /// Organization display name
    pub organization_name: String,

    /// Street line of the organization
    pub address: String,

    pub city: String,

    /// Numeric postal code, zero when unknown
    pub zipcode: u32,

    /// Region label derived from the postal code
    pub region: String,

    /// When the record was assembled
    pub harvested_at: DateTime<Utc>,
}

impl PractitionerRecord {
    /// Creates a new builder for constructing a PractitionerRecord
    pub fn builder() -> PractitionerRecordBuilder {
        PractitionerRecordBuilder::default()
    }
}

/// Builder for constructing PractitionerRecord instances
#[derive(Debug, Default)]
pub struct PractitionerRecordBuilder {
    identifier: Option<String>,
    first_name: String,
    last_name: String,
    phone: String,
    email: String,
    organization_id: Option<String>,
    organization_name: String,
    address: String,
    city: String,
    zipcode: u32,
    region: String,
    harvested_at: Option<DateTime<Utc>>,
}

impl PractitionerRecordBuilder {
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn organization_name(mut self, organization_name: impl Into<String>) -> Self {
        self.organization_name = organization_name.into();
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn zipcode(mut self, zipcode: u32) -> Self {
        self.zipcode = zipcode;
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn harvested_at(mut self, harvested_at: DateTime<Utc>) -> Self {
        self.harvested_at = Some(harvested_at);
        self
    }

    /// Builds the PractitionerRecord
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier or organization id is missing or blank
    pub fn build(self) -> Result<PractitionerRecord, String> {
        let identifier = self
            .identifier
            .filter(|id| !id.trim().is_empty())
            .ok_or("identifier is required")?;
        let organization_id = self
            .organization_id
            .filter(|id| !id.trim().is_empty())
            .ok_or("organization_id is required")?;

        Ok(PractitionerRecord {
            identifier,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            email: self.email,
            organization_id,
            organization_name: self.organization_name,
            address: self.address,
            city: self.city,
            zipcode: self.zipcode,
            region: self.region,
            harvested_at: self.harvested_at.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_identifier() {
        let result = PractitionerRecord::builder().organization_id("org-1").build();
        assert_eq!(result.unwrap_err(), "identifier is required");

        let blank = PractitionerRecord::builder()
            .identifier("  ")
            .organization_id("org-1")
            .build();
        assert!(blank.is_err());
    }

    #[test]
    fn test_builder_requires_organization() {
        let result = PractitionerRecord::builder().identifier("123").build();
        assert_eq!(result.unwrap_err(), "organization_id is required");
    }

    #[test]
    fn test_record_serializes_flat_fields() {
        let record = PractitionerRecord::builder()
            .identifier("123")
            .organization_id("org-1")
            .city("MAMOUDZOU")
            .zipcode(97600)
            .region("Mayotte")
            .build()
            .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["city"], "MAMOUDZOU");
        assert_eq!(json["zipcode"], 97600);
        assert_eq!(json["region"], "Mayotte");
    }
}
