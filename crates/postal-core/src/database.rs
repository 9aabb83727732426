//! # Territory Database Contract
//!
//! The resolution engine consumes the ISO 3166 reference data through this
//! trait only. Implementations must be immutable once constructed: the
//! engine memoizes sets derived from the iterators for its whole lifetime.

use crate::error::LookupError;
use crate::territory::{Country, Subdivision};

/// Read-only access to ISO 3166 countries and subdivisions.
///
/// Lookups take codes exactly as stored (upper-case); callers normalize
/// before asking.
pub trait TerritoryDatabase: Send + Sync {
    /// Look up a country by alpha-2 code.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] if no such country exists.
    fn country(&self, alpha_2: &str) -> Result<&Country, LookupError>;

    /// Look up a subdivision by full code.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] if no such subdivision exists.
    fn subdivision(&self, code: &str) -> Result<&Subdivision, LookupError>;

    /// Iterate every known country.
    fn countries(&self) -> Box<dyn Iterator<Item = &Country> + '_>;

    /// Iterate every known subdivision.
    fn subdivisions(&self) -> Box<dyn Iterator<Item = &Subdivision> + '_>;
}
