//! # Territory Entities
//!
//! The two kinds of administrative territory known to the stack:
//! ISO 3166-1 countries and ISO 3166-2 subdivisions, plus the
//! [`Territory`] sum type returned by hierarchy walks.
//!
//! Codes are stored upper-case, exactly as they appear in the dataset.
//! No format validation beyond shape happens here; validity of a code is
//! defined by membership in a [`TerritoryDatabase`](crate::TerritoryDatabase).

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ISO 3166-1 country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    /// Alpha-2 code, e.g. `"US"`.
    pub alpha_2: String,
    /// Display name, e.g. `"United States"`.
    pub name: String,
}

impl Country {
    /// Create a country entity.
    pub fn new(alpha_2: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alpha_2: alpha_2.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An ISO 3166-2 subdivision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subdivision {
    /// Full subdivision code, e.g. `"US-CA"`.
    pub code: String,
    /// Display name, e.g. `"California"`.
    pub name: String,
    /// Human-readable type, e.g. `"State"` or `"Metropolitan department"`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Code of the enclosing subdivision, `None` for top-level subdivisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
    /// Alpha-2 code of the country the subdivision belongs to.
    pub country_code: String,
}

impl Subdivision {
    /// Create a subdivision, deriving its country from the code prefix.
    ///
    /// Returns `None` if `code` has no `-` separated country prefix.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        type_name: impl Into<String>,
        parent_code: Option<String>,
    ) -> Option<Self> {
        let code = code.into();
        let country_code = country_prefix(&code)?.to_string();
        Some(Self {
            code,
            name: name.into(),
            type_name: type_name.into(),
            parent_code: parent_code.filter(|p| !p.is_empty()),
            country_code,
        })
    }

    /// Whether the subdivision sits directly under its country.
    pub fn is_top_level(&self) -> bool {
        self.parent_code.is_none()
    }
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Either level of the containment hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Territory {
    /// A country, the root of every containment chain.
    Country(Country),
    /// A subdivision at any depth.
    Subdivision(Subdivision),
}

impl Territory {
    /// The territory's own code (alpha-2 for countries).
    pub fn code(&self) -> &str {
        match self {
            Self::Country(c) => &c.alpha_2,
            Self::Subdivision(s) => &s.code,
        }
    }

    /// The territory's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Country(c) => &c.name,
            Self::Subdivision(s) => &s.name,
        }
    }

    /// The subdivision, if this is one.
    pub fn as_subdivision(&self) -> Option<&Subdivision> {
        match self {
            Self::Subdivision(s) => Some(s),
            Self::Country(_) => None,
        }
    }
}

impl fmt::Display for Territory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Country prefix of a subdivision code (`"US"` for `"US-CA"`).
pub fn country_prefix(code: &str) -> Option<&str> {
    match code.split_once('-') {
        Some((country, region)) if !country.is_empty() && !region.is_empty() => Some(country),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdivision_country_from_prefix() {
        let s = Subdivision::new("US-CA", "California", "State", None).unwrap();
        assert_eq!(s.country_code, "US");
        assert!(s.is_top_level());
    }

    #[test]
    fn subdivision_rejects_prefixless_code() {
        assert!(Subdivision::new("USCA", "California", "State", None).is_none());
        assert!(Subdivision::new("US-", "California", "State", None).is_none());
    }

    #[test]
    fn empty_parent_is_top_level() {
        let s = Subdivision::new("FR-IDF", "Île-de-France", "Metropolitan region", Some(String::new()))
            .unwrap();
        assert!(s.parent_code.is_none());
    }

    #[test]
    fn territory_code_and_name() {
        let c = Territory::Country(Country::new("FR", "France"));
        assert_eq!(c.code(), "FR");
        assert_eq!(c.to_string(), "France");
        assert!(c.as_subdivision().is_none());

        let s = Territory::Subdivision(
            Subdivision::new("FR-75", "Paris", "Metropolitan department", Some("FR-IDF".into()))
                .unwrap(),
        );
        assert_eq!(s.code(), "FR-75");
        assert_eq!(s.as_subdivision().map(|s| s.country_code.as_str()), Some("FR"));
    }

    #[test]
    fn subdivision_serializes_type_field() {
        let s = Subdivision::new("US-CA", "California", "State", None).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "State");
        assert!(json.get("parent_code").is_none());
    }
}
