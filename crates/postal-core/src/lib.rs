//! # postal-core: Foundational Types for the Postal Territory Stack
//!
//! This crate is the leaf of the workspace. It defines the territory
//! entities (ISO 3166-1 countries, ISO 3166-2 subdivisions), the
//! [`TerritoryDatabase`] contract through which every other crate reads
//! the reference dataset, and an in-memory implementation of that
//! contract backed by a JSON or YAML dataset document.
//!
//! ## Key Design Principles
//!
//! 1. **The dataset is a collaborator, not a global.** Resolution code never
//!    reaches for a static dataset; it is handed a `TerritoryDatabase`.
//!
//! 2. **Absence is a typed outcome.** Lookups return
//!    [`LookupError::NotFound`] rather than panicking, so callers decide
//!    whether a missing entity is an error or an expected "no answer".
//!
//! 3. **Datasets are checked on load.** Duplicate codes, dangling parents and
//!    subdivisions of unknown countries are rejected by
//!    [`InMemoryDatabase`] before any resolution runs.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `postal-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod database;
pub mod dataset;
pub mod error;
pub mod territory;

// Re-export primary types for ergonomic imports.
pub use database::TerritoryDatabase;
pub use dataset::{DatasetDocument, InMemoryDatabase};
pub use error::{DatasetError, LookupError, TerritoryKind};
pub use territory::{Country, Subdivision, Territory};
