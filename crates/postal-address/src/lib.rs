//! # postal-address: Address Normalizer/Validator
//!
//! Structured postal addresses checked against the territory resolution
//! engine.
//!
//! ```no_run
//! use postal_address::Address;
//! use postal_territory::TerritoryResolver;
//!
//! let resolver = TerritoryResolver::bundled()?;
//! let address = Address::new(
//!     &resolver,
//!     [
//!         ("line1", "1 Infinite Loop"),
//!         ("postal_code", "95014"),
//!         ("city_name", "Cupertino"),
//!         ("subdivision_code", "US-CA"),
//!     ],
//! )?;
//! assert_eq!(address.country_code(), Some("US"));
//! address.validate()?;
//! println!("{address}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Policy
//!
//! - Only base components are writable; derived metadata comes from the
//!   subdivision hierarchy.
//! - `normalize()` errors are [`AddressError`]; `validate()` errors are
//!   [`ValidationError`] and never mutate.

pub mod address;
pub mod component;
pub mod error;
pub mod metadata;

pub use address::{Address, AddressFields};
pub use component::{ComponentId, ComponentValue};
pub use error::{AddressError, ValidationError};
