//! # Error Types
//!
//! Construction and normalization fail with [`AddressError`]. Consistency
//! checks run by [`Address::validate`](crate::Address::validate) fail with
//! [`ValidationError`] and never mutate the address.

use postal_territory::TerritoryError;
use thiserror::Error;

use crate::component::ComponentId;

/// Errors raised while building or normalizing an address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The identifier is not one of the base components.
    #[error("{0:?} is not an address component that can be set directly")]
    UnknownComponent(String),

    /// Normalization would overwrite a user-supplied value with a different
    /// one derived from the subdivision.
    #[error(
        "{subdivision} subdivision is trying to replace {component}={current:?} \
         by {component}={derived:?}"
    )]
    ConflictingTerritoryMetadata {
        /// Subdivision the metadata was derived from.
        subdivision: String,
        /// Component that would be overwritten.
        component: String,
        /// Value supplied by the caller.
        current: String,
        /// Value derived from the territory database.
        derived: String,
    },

    /// The resolution engine failed while walking the subdivision.
    #[error(transparent)]
    Territory(#[from] TerritoryError),
}

/// Reasons an address is not valid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {0:?} subdivision code")]
    InvalidSubdivisionCode(String),

    #[error("invalid {0:?} country code")]
    InvalidCountryCode(String),

    #[error("{country:?} country is not a parent of {subdivision:?} subdivision")]
    CountrySubdivisionMismatch { country: String, subdivision: String },

    #[error("address requires {0}")]
    MissingRequiredField(ComponentId),
}
