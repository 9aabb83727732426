//! # postal-territory: Territory Resolution Engine
//!
//! Resolves raw ISO 3166 codes to canonical codes and relates territories
//! to each other:
//!
//! - [`TerritoryResolver::normalize_territory_code`]: layered alias
//!   resolution producing one canonical code.
//! - [`TerritoryResolver::territory_attachment`]: political attachment of
//!   dependent territories.
//! - [`TerritoryResolver::country_from_subdivision`] and
//!   [`TerritoryResolver::default_subdivision_code`]: best-effort answers
//!   that return `None` instead of failing.
//! - [`TerritoryResolver::territory_children_codes`] and
//!   [`TerritoryResolver::territory_parents`]: containment hierarchy walks.
//! - [`TerritoryResolver::country_aliases`]: cycle-safe closure of
//!   equivalent country codes.
//!
//! ## Crate Policy
//!
//! - Alias tables are compile-time data indexed once per process.
//! - Caches derived from the dataset live on the resolver, never in globals.
//! - No `.unwrap()` outside tests.

pub mod aliases;
pub mod equivalence;
pub mod error;
pub mod hierarchy;
pub mod resolver;

pub use aliases::{alias_tables, AliasTables};
pub use error::TerritoryError;
pub use resolver::{NormalizeOptions, TerritoryResolver};
