//! Canonical postal addresses
//!
//! [`AddressResolver`] turns an organization's raw address array into one
//! [`Address`]. Only the first entry is read. Field sources, by priority:
//!
//! - **line**: the pre-formatted `line[0]` text; the structured street
//!   components are composed into a line only when it is blank.
//! - **city**: a post-box or city-code extension on `_line[0]`; else the raw
//!   `city` with a leading 5-digit postal code stripped; else the raw city.
//! - **zipcode / region**: `postalCode` parsed as an integer, mapped to the
//!   overseas department it belongs to.
//!
//! Malformed or missing data degrades to empty fields, never to an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

pub const HOUSE_NUMBER_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/iso21090-ADXP-houseNumber";
pub const STREET_NAME_TYPE_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/iso21090-ADXP-streetNameType";
pub const BUILDING_NUMBER_SUFFIX_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/iso21090-ADXP-buildingNumberSuffix";
pub const STREET_NAME_BASE_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/iso21090-ADXP-streetNameBase";
pub const LIEU_DIT_EXTENSION: &str =
    "https://interop.esante.gouv.fr/ig/fhir/annuaire/StructureDefinition/as-ext-lieu-dit";
pub const POST_BOX_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/iso21090-ADXP-postBox";
pub const CITY_CODE_EXTENSION: &str =
    "http://hl7.org/fhir/us/vr-common-library/StructureDefinition/CityCode";

/// Postal code wrongly embedded at the start of the city text
static CITY_WITH_POSTAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d{5}\s+(\S.*)$").expect("city pattern is a valid regex"));

/// Overseas department derived from a zipcode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Region {
    Reunion,
    Mayotte,
    #[default]
    Other,
}

impl Region {
    /// 97400-97499 is Reunion, 97600-97699 is Mayotte
    pub fn from_zipcode(zipcode: u32) -> Self {
        match zipcode {
            97400..=97499 => Region::Reunion,
            97600..=97699 => Region::Mayotte,
            _ => Region::Other,
        }
    }

    /// Label used in output records; empty for [`Region::Other`]
    pub fn label(&self) -> &'static str {
        match self {
            Region::Reunion => "Reunion",
            Region::Mayotte => "Mayotte",
            Region::Other => "",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured street parts carried by `_line[0]` extensions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreetComponents {
    pub house_number: String,
    pub building_number_suffix: String,
    pub street_name_type: String,
    pub street_name_base: String,
    pub lieu_dit: String,
}

impl StreetComponents {
    pub fn is_empty(&self) -> bool {
        self.parts().all(str::is_empty)
    }

    /// Non-empty parts joined with spaces, e.g. `12 bis Rue des Lilas`
    pub fn compose(&self) -> String {
        self.parts()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn parts(&self) -> impl Iterator<Item = &str> {
        [
            self.house_number.as_str(),
            self.building_number_suffix.as_str(),
            self.street_name_type.as_str(),
            self.street_name_base.as_str(),
            self.lieu_dit.as_str(),
        ]
        .into_iter()
    }
}

/// A resolved postal address
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub line: String,
    pub city: String,
    /// 0 when the postal code is missing or not numeric
    pub zipcode: u32,
    pub region: Region,
    pub street: StreetComponents,
    /// Reserved, never populated
    pub latitude: Option<f64>,
    /// Reserved, never populated
    pub longitude: Option<f64>,
}

/// Derives an [`Address`] from a raw FHIR address array
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressResolver;

impl AddressResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves the first address entry; `None` when the array is empty
    pub fn resolve(&self, addresses: &[Value]) -> Option<Address> {
        let first = addresses.first()?;
        let Some(fields) = first.as_object() else {
            return Some(Address::default());
        };

        let extensions = line_extensions(first);
        let street = street_components(&extensions);

        let mut line = fields
            .get("line")
            .and_then(|line| line.get(0))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if line.is_empty() {
            line = street.compose();
        }

        let city = extensions
            .iter()
            .filter(|(url, _)| *url == POST_BOX_EXTENSION || *url == CITY_CODE_EXTENSION)
            .filter(|(_, value)| !value.is_empty())
            .last()
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| {
                fields
                    .get("city")
                    .and_then(Value::as_str)
                    .map(strip_postal_code)
                    .unwrap_or_default()
            });

        let zipcode = fields.get("postalCode").map(parse_zipcode).unwrap_or(0);

        Some(Address {
            line,
            city,
            zipcode,
            region: Region::from_zipcode(zipcode),
            street,
            latitude: None,
            longitude: None,
        })
    }
}

/// `(url, trimmed valueString)` of every extension on `_line[0]`
fn line_extensions(address: &Value) -> Vec<(&str, &str)> {
    address
        .get("_line")
        .and_then(|line| line.get(0))
        .and_then(|line| line.get("extension"))
        .and_then(Value::as_array)
        .map(|extensions| {
            extensions
                .iter()
                .filter_map(|ext| {
                    let url = ext.get("url")?.as_str()?;
                    let value = ext.get("valueString")?.as_str()?;
                    Some((url, value.trim()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn street_components(extensions: &[(&str, &str)]) -> StreetComponents {
    let mut street = StreetComponents::default();
    for (url, value) in extensions {
        let slot = match *url {
            HOUSE_NUMBER_EXTENSION => &mut street.house_number,
            BUILDING_NUMBER_SUFFIX_EXTENSION => &mut street.building_number_suffix,
            STREET_NAME_TYPE_EXTENSION => &mut street.street_name_type,
            STREET_NAME_BASE_EXTENSION => &mut street.street_name_base,
            LIEU_DIT_EXTENSION => &mut street.lieu_dit,
            _ => continue,
        };
        *slot = value.to_string();
    }
    street
}

fn strip_postal_code(city: &str) -> String {
    CITY_WITH_POSTAL_CODE
        .captures(city)
        .and_then(|captures| captures.get(1))
        .map_or(city, |remainder| remainder.as_str())
        .trim()
        .to_string()
}

fn parse_zipcode(postal_code: &Value) -> u32 {
    match postal_code {
        Value::String(code) => code.trim().parse().unwrap_or(0),
        Value::Number(code) => code
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .unwrap_or(0),
        _ => 0,
    }
}
