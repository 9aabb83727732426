//! # postal-cli: Postal Territory Command-Line Interface
//!
//! Shell access to the territory resolution engine and the address
//! validator.
//!
//! ## Subcommands
//!
//! - `normalize`, `attachment`: canonical codes
//! - `country`, `default-subdivision`: best-effort guesses
//! - `children`, `parents`, `aliases`: hierarchy and equivalence
//! - `address`: normalize, validate, and render an address
//!
//! ## Crate Policy
//!
//! - Argument parsing lives next to its handler; handlers delegate to the
//!   library crates.
//! - Handlers write to a caller-supplied sink and return the process exit
//!   code, so they are testable without spawning the binary.

pub mod address;
pub mod dataset;
pub mod territory;
