//! Search result bundles
//!
//! This module decodes search responses into a [`BundleResult`]: the bundle
//! id, its ordered link relations and its ordered entries. Entries are
//! discriminated once, at decode time, into the [`Resource`] variants the
//! client works with; anything else becomes [`Resource::Unknown`].
//!
//! Address arrays and practitioner names are kept as raw JSON values. Their
//! shape varies between directory profiles and they are interpreted later by
//! the address resolver and the field extractor, which degrade instead of
//! failing. A field with an unexpected JSON shape decodes to its default, so
//! one odd resource never costs the rest of the page.

use crate::domain::ids::{Reference, ResourceType};
use crate::domain::{FhirError, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Relation name of the continuation link
pub const NEXT_RELATION: &str = "next";

/// A decoded search result page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BundleResult {
    /// Bundle logical id
    #[serde(default)]
    pub id: String,

    /// Link relations in server order
    #[serde(default, rename = "link")]
    pub links: Vec<Link>,

    /// Entries in server order
    #[serde(default, rename = "entry")]
    pub entries: Vec<Entry>,
}

/// A link relation of a bundle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    #[serde(default, deserialize_with = "lenient")]
    pub relation: String,

    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
}

/// A bundle entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Entry {
    #[serde(default, rename = "fullUrl")]
    pub full_url: Option<String>,

    #[serde(default)]
    pub resource: Resource,
}

/// The resource shapes the client distinguishes
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Resource {
    Organization(Organization),
    PractitionerRole(PractitionerRole),
    Practitioner(Practitioner),
    /// Any other or missing resource type
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Organization {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    /// Raw address array, read by the address resolver
    #[serde(default, deserialize_with = "lenient")]
    pub address: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PractitionerRole {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient")]
    pub practitioner: Option<ReferenceField>,

    #[serde(default, deserialize_with = "lenient")]
    pub organization: Option<ReferenceField>,

    #[serde(default, deserialize_with = "lenient")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Practitioner {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient")]
    pub name: Vec<Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub qualification: Vec<Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub telecom: Vec<Value>,
}

/// A `{"reference": "..."}` object
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReferenceField {
    #[serde(default, deserialize_with = "lenient")]
    pub reference: Option<Reference>,
}

/// Decodes a field, falling back to its default when the JSON has an
/// unexpected shape (`null`, an object where an array is expected, ...)
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let resource_type = value
            .get("resourceType")
            .and_then(Value::as_str)
            .and_then(|rt| ResourceType::from_str(rt).ok());

        let resource = match resource_type {
            Some(ResourceType::Organization) => typed(value, Resource::Organization),
            Some(ResourceType::PractitionerRole) => typed(value, Resource::PractitionerRole),
            Some(ResourceType::Practitioner) => typed(value, Resource::Practitioner),
            None => Resource::Unknown,
        };
        Ok(resource)
    }
}

fn typed<T: DeserializeOwned>(value: Value, variant: fn(T) -> Resource) -> Resource {
    match serde_json::from_value(value) {
        Ok(resource) => variant(resource),
        Err(e) => {
            tracing::warn!(error = %e, "Resource has an unexpected shape, ignoring it");
            Resource::Unknown
        }
    }
}

impl Resource {
    pub fn resource_type(&self) -> Option<ResourceType> {
        match self {
            Resource::Organization(_) => Some(ResourceType::Organization),
            Resource::PractitionerRole(_) => Some(ResourceType::PractitionerRole),
            Resource::Practitioner(_) => Some(ResourceType::Practitioner),
            Resource::Unknown => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        let id = match self {
            Resource::Organization(org) => &org.id,
            Resource::PractitionerRole(role) => &role.id,
            Resource::Practitioner(p) => &p.id,
            Resource::Unknown => return None,
        };
        Some(id.as_str()).filter(|id| !id.is_empty())
    }

    /// Display name, for resources whose name is a plain string
    pub fn name(&self) -> Option<&str> {
        match self {
            Resource::Organization(org) => org.name.as_deref(),
            _ => None,
        }
    }

    /// Raw address array (empty for resources without addresses)
    pub fn addresses(&self) -> &[Value] {
        match self {
            Resource::Organization(org) => &org.address,
            _ => &[],
        }
    }

    /// Id of the referenced practitioner, prefix-checked
    pub fn practitioner_reference(&self) -> Option<&str> {
        match self {
            Resource::PractitionerRole(role) => role
                .practitioner
                .as_ref()?
                .reference
                .as_ref()?
                .id_for(ResourceType::Practitioner),
            _ => None,
        }
    }

    /// Id of the referenced organization, prefix-checked
    pub fn organization_reference(&self) -> Option<&str> {
        match self {
            Resource::PractitionerRole(role) => role
                .organization
                .as_ref()?
                .reference
                .as_ref()?
                .id_for(ResourceType::Organization),
            _ => None,
        }
    }
}

impl Entry {
    pub fn resource_type(&self) -> Option<ResourceType> {
        self.resource.resource_type()
    }

    pub fn id(&self) -> Option<&str> {
        self.resource.id()
    }
}

impl BundleResult {
    /// Decodes a search response body
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidResponse`] when the body is not a bundle
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| FhirError::InvalidResponse(format!("bundle decode failed: {e}")).into())
    }

    /// URL of the `next` relation, if any
    pub fn next_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.relation == NEXT_RELATION)
            .map(|link| link.url.as_str())
    }

    /// Entries of a given resource type, in bundle order
    pub fn entries_of(&self, resource_type: ResourceType) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(move |entry| entry.resource_type() == Some(resource_type))
    }
}

#[derive(Deserialize)]
struct EntryProbe {
    #[serde(default)]
    entry: Vec<IgnoredAny>,
}

/// Counts the entries of a raw bundle without decoding them
///
/// # Errors
///
/// Returns [`FhirError::InvalidResponse`] when the body is not JSON
pub fn count_entries(bytes: &[u8]) -> Result<usize> {
    let probe: EntryProbe = serde_json::from_slice(bytes)
        .map_err(|e| FhirError::InvalidResponse(format!("bundle probe failed: {e}")))?;
    Ok(probe.entry.len())
}
