//! Search parameter sets
//!
//! A [`ParameterSet`] is a bag of optional search filters. Sets are built
//! fresh for each fluent call and combined by value:
//!
//! - [`ParameterSet::intersect`] narrows: singular fields set on the right
//!   replace the left-hand ones (logical AND across refinements).
//! - [`ParameterSet::union`] widens: multi-valued fields set on the right are
//!   appended as comma-separated alternatives (logical OR).
//!
//! Fields left at their default are never serialized, so the server only
//! ever sees the filters that were asked for.
//!
//! ```
//! use annuaire::fhir::params::ParameterSet;
//!
//! let params = ParameterSet::postal_code_contains("974")
//!     .union(ParameterSet::postal_code_contains("976"))
//!     .intersect(ParameterSet::active());
//!
//! assert_eq!(
//!     params.to_query_pairs(),
//!     vec![
//!         ("address-postalcode", "974,976".to_string()),
//!         ("active", "true".to_string()),
//!     ]
//! );
//! ```

/// Wire names of the search parameters
pub mod keys {
    pub const NAME: &str = "name";
    pub const ADDRESS_POSTALCODE: &str = "address-postalcode";
    pub const ROLE: &str = "role";
    pub const QUALIFICATION_CODE: &str = "qualification-code";
    pub const ID: &str = "_id";
    pub const ACTIVE: &str = "active";
    pub const GET_PAGES: &str = "_getpages";
    pub const PAGE_ID: &str = "_pageId";
    pub const BUNDLE_TYPE: &str = "_bundletype";
    pub const COUNT: &str = "_count";
    pub const REV_INCLUDE: &str = "_revinclude";
    /// Opaque cursor of the `/_page?id=` pagination endpoint
    pub const PAGE_CURSOR: &str = "id";
}

/// Named, optional search filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    /// Logical id filter (`_id`)
    pub id: Option<String>,

    /// Name substring, comma-joined alternatives
    pub name: Option<String>,

    /// Postal code substring, comma-joined alternatives
    pub address_postalcode: Option<String>,

    pub role: Option<String>,

    /// Qualification code, comma-joined alternatives after a union
    pub qualification_code: Option<String>,

    /// Only sent when true
    pub active: bool,

    /// Reverse-include directive, e.g. `PractitionerRole:organization`
    pub rev_include: Option<String>,

    /// Cursor id for `/_page` continuations
    pub page_cursor: Option<String>,

    /// `_getpages` token of offset continuations
    pub get_pages: Option<String>,

    /// `_pageId` of offset continuations
    pub page_id: Option<String>,

    /// `_bundletype` of offset continuations
    pub bundle_type: Option<String>,

    /// Page size (`_count`)
    pub count: Option<u32>,
}

impl ParameterSet {
    /// An empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: non_blank(id.into()),
            ..Self::default()
        }
    }

    pub fn name_contains(name: impl Into<String>) -> Self {
        Self {
            name: non_blank(name.into()),
            ..Self::default()
        }
    }

    pub fn postal_code_contains(code: impl Into<String>) -> Self {
        Self {
            address_postalcode: non_blank(code.into()),
            ..Self::default()
        }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: non_blank(role.into()),
            ..Self::default()
        }
    }

    pub fn qualification_code(code: impl Into<String>) -> Self {
        Self {
            qualification_code: non_blank(code.into()),
            ..Self::default()
        }
    }

    pub fn active() -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }

    pub fn rev_include(directive: impl Into<String>) -> Self {
        Self {
            rev_include: non_blank(directive.into()),
            ..Self::default()
        }
    }

    pub fn count(count: u32) -> Self {
        Self {
            count: (count > 0).then_some(count),
            ..Self::default()
        }
    }

    /// Continuation parameters of the cursor pagination scheme
    pub fn page_cursor(cursor: impl Into<String>) -> Self {
        Self {
            page_cursor: non_blank(cursor.into()),
            ..Self::default()
        }
    }

    /// Continuation parameters of the offset pagination scheme
    pub fn offset_page(
        get_pages: impl Into<String>,
        page_id: Option<String>,
        bundle_type: Option<String>,
    ) -> Self {
        Self {
            get_pages: non_blank(get_pages.into()),
            page_id: page_id.and_then(non_blank),
            bundle_type: bundle_type.and_then(non_blank),
            ..Self::default()
        }
    }

    /// Logical AND: every singular field `other` sets replaces ours.
    ///
    /// Multi-valued fields (`name`, `address_postalcode`) are left untouched.
    pub fn intersect(mut self, other: ParameterSet) -> Self {
        if other.active {
            self.active = true;
        }
        overwrite(&mut self.qualification_code, other.qualification_code);
        overwrite(&mut self.id, other.id);
        overwrite(&mut self.role, other.role);
        overwrite(&mut self.rev_include, other.rev_include);
        overwrite(&mut self.page_cursor, other.page_cursor);
        overwrite(&mut self.get_pages, other.get_pages);
        overwrite(&mut self.page_id, other.page_id);
        overwrite(&mut self.bundle_type, other.bundle_type);
        if other.count.is_some() {
            self.count = other.count;
        }
        self
    }

    /// Logical OR: multi-valued fields `other` sets are appended as
    /// comma-separated alternatives. Nothing already present is dropped.
    pub fn union(mut self, other: ParameterSet) -> Self {
        append(&mut self.name, other.name);
        append(&mut self.address_postalcode, other.address_postalcode);
        append(&mut self.qualification_code, other.qualification_code);
        self
    }

    /// True when no field would be serialized
    pub fn is_empty(&self) -> bool {
        self.to_query_pairs().is_empty()
    }

    /// Serializes the set to query pairs, skipping every default field
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, keys::NAME, &self.name);
        push(&mut pairs, keys::ADDRESS_POSTALCODE, &self.address_postalcode);
        push(&mut pairs, keys::ROLE, &self.role);
        push(&mut pairs, keys::QUALIFICATION_CODE, &self.qualification_code);
        push(&mut pairs, keys::ID, &self.id);
        if self.active {
            pairs.push((keys::ACTIVE, "true".to_string()));
        }
        push(&mut pairs, keys::PAGE_CURSOR, &self.page_cursor);
        push(&mut pairs, keys::GET_PAGES, &self.get_pages);
        push(&mut pairs, keys::PAGE_ID, &self.page_id);
        push(&mut pairs, keys::BUNDLE_TYPE, &self.bundle_type);
        if let Some(count) = self.count.filter(|c| *c > 0) {
            pairs.push((keys::COUNT, count.to_string()));
        }
        push(&mut pairs, keys::REV_INCLUDE, &self.rev_include);
        pairs
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn overwrite(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value.and_then(non_blank) {
        *target = Some(value);
    }
}

fn append(target: &mut Option<String>, value: Option<String>) {
    let Some(value) = value.and_then(non_blank) else {
        return;
    };
    match target {
        Some(existing) if !existing.is_empty() => {
            existing.push(',');
            existing.push_str(&value);
        }
        _ => *target = Some(value),
    }
}

fn push(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
        pairs.push((key, value.to_string()));
    }
}
