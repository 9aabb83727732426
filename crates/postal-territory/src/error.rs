//! # Resolution Errors

use postal_core::LookupError;
use thiserror::Error;

/// Errors raised by the territory resolution engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerritoryError {
    /// The code is neither in the dataset nor a key of any alias table.
    #[error("unrecognized {0:?} territory code")]
    UnrecognizedTerritory(String),

    /// A code the engine needed to dereference is missing from the dataset.
    #[error(transparent)]
    NotFound(#[from] LookupError),

    /// The dataset's parent links loop back on themselves.
    #[error("territory hierarchy cycle detected at {0:?}")]
    HierarchyCycle(String),
}
