//! # Address Components
//!
//! The closed set of components a caller may set directly, and the value
//! type stored for every component, base or derived.
//!
//! Derived metadata identifiers are open-ended (they come from subdivision
//! type names), so the component map itself is keyed by string. Only the
//! [`ComponentId`] set can be written through the public API.

use std::fmt;
use std::str::FromStr;

use postal_core::Subdivision;
use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// A base component of a postal address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentId {
    /// First street line. Never empty when any line is set.
    Line1,
    /// Second street line.
    Line2,
    PostalCode,
    CityName,
    /// ISO 3166-1 alpha-2 code.
    CountryCode,
    /// ISO 3166-2 code.
    SubdivisionCode,
}

impl ComponentId {
    /// All base components in rendering order.
    pub fn all() -> &'static [ComponentId] {
        &[
            Self::Line1,
            Self::Line2,
            Self::PostalCode,
            Self::CityName,
            Self::CountryCode,
            Self::SubdivisionCode,
        ]
    }

    /// Components [`Address::validate`](crate::Address::validate) requires,
    /// in the order they are checked.
    pub fn required() -> &'static [ComponentId] {
        &[Self::Line1, Self::PostalCode, Self::CityName, Self::CountryCode]
    }

    /// Base components derived subdivision metadata may legitimately write.
    pub fn metadata_whitelist() -> &'static [ComponentId] {
        &[Self::CityName]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line1 => "line1",
            Self::Line2 => "line2",
            Self::PostalCode => "postal_code",
            Self::CityName => "city_name",
            Self::CountryCode => "country_code",
            Self::SubdivisionCode => "subdivision_code",
        }
    }

    /// Whether `id` names a base component.
    pub fn is_base(id: &str) -> bool {
        Self::all().iter().any(|base| base.as_str() == id)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentId {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line1" => Ok(Self::Line1),
            "line2" => Ok(Self::Line2),
            "postal_code" => Ok(Self::PostalCode),
            "city_name" => Ok(Self::CityName),
            "country_code" => Ok(Self::CountryCode),
            "subdivision_code" => Ok(Self::SubdivisionCode),
            other => Err(AddressError::UnknownComponent(other.to_string())),
        }
    }
}

/// The value of one address component.
///
/// Base components and the `_code`/`_name`/`_type_name` metadata are text.
/// The bare `<type>` metadata entry holds the subdivision itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ComponentValue {
    Text(String),
    Subdivision(Subdivision),
}

impl ComponentValue {
    /// The text of a text component.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Subdivision(_) => None,
        }
    }

    pub fn as_subdivision(&self) -> Option<&Subdivision> {
        match self {
            Self::Subdivision(subdivision) => Some(subdivision),
            Self::Text(_) => None,
        }
    }

    /// Whether the value counts as unset.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Subdivision(_) => false,
        }
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Subdivision(subdivision) => f.write_str(&subdivision.name),
        }
    }
}

impl From<String> for ComponentValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ComponentValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Subdivision> for ComponentValue {
    fn from(subdivision: Subdivision) -> Self {
        Self::Subdivision(subdivision)
    }
}
