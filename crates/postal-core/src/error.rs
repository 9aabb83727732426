//! # Error Types
//!
//! Errors raised by the territory database layer. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - [`LookupError`] is the only error a [`TerritoryDatabase`] lookup
//!   produces. Callers higher up turn it into "no answer" where absence is
//!   an expected outcome.
//! - [`DatasetError`] covers loading and consistency-checking a dataset
//!   document, and names the offending code.
//!
//! [`TerritoryDatabase`]: crate::TerritoryDatabase

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which table of the database a code was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryKind {
    /// ISO 3166-1 alpha-2 country.
    Country,
    /// ISO 3166-2 subdivision.
    Subdivision,
}

impl fmt::Display for TerritoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Country => f.write_str("country"),
            Self::Subdivision => f.write_str("subdivision"),
        }
    }
}

/// A lookup against the territory database missed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No entity with this code exists in the database.
    #[error("{kind} {code:?} not found in territory database")]
    NotFound {
        /// Table that was searched.
        kind: TerritoryKind,
        /// The code as given to the lookup.
        code: String,
    },
}

impl LookupError {
    /// Shorthand for a missing country.
    pub fn country(code: impl Into<String>) -> Self {
        Self::NotFound {
            kind: TerritoryKind::Country,
            code: code.into(),
        }
    }

    /// Shorthand for a missing subdivision.
    pub fn subdivision(code: impl Into<String>) -> Self {
        Self::NotFound {
            kind: TerritoryKind::Subdivision,
            code: code.into(),
        }
    }
}

/// Error loading or checking a dataset document.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset file could not be read.
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON document is malformed.
    #[error("invalid JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    /// The YAML document is malformed.
    #[error("invalid YAML dataset: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension does not name a supported format.
    #[error("unsupported dataset format {extension:?}; expected .json, .yaml or .yml")]
    UnsupportedFormat {
        /// Extension found on the path (empty if none).
        extension: String,
    },

    /// The same code appears twice in one table.
    #[error("duplicate {kind} code {code:?} in dataset")]
    DuplicateCode {
        /// Table containing the duplicate.
        kind: TerritoryKind,
        /// The duplicated code.
        code: String,
    },

    /// A subdivision code is not of the `XX-YYY` shape.
    #[error("malformed subdivision code {0:?}; expected <country>-<region>")]
    MalformedSubdivisionCode(String),

    /// A subdivision's country prefix is not a country of the dataset.
    #[error("subdivision {subdivision:?} belongs to unknown country {country:?}")]
    UnknownCountry {
        /// The orphaned subdivision.
        subdivision: String,
        /// Its country prefix.
        country: String,
    },

    /// A subdivision names a parent that is not in the dataset.
    #[error("subdivision {subdivision:?} has unknown parent {parent:?}")]
    UnknownParent {
        /// The subdivision declaring the parent.
        subdivision: String,
        /// The missing parent code.
        parent: String,
    },
}
