//! # Dataset Selection
//!
//! Builds the resolver every subcommand runs against: the bundled ISO 3166
//! dataset, or a dataset document given with `--database`.

use std::path::Path;

use anyhow::{Context, Result};
use postal_core::InMemoryDatabase;
use postal_territory::TerritoryResolver;

/// Load the resolver for this invocation.
pub fn load_resolver(database: Option<&Path>) -> Result<TerritoryResolver> {
    let db = match database {
        Some(path) => InMemoryDatabase::from_file(path)
            .with_context(|| format!("failed to load territory database: {}", path.display()))?,
        None => InMemoryDatabase::bundled().context("bundled territory database is corrupt")?,
    };
    tracing::debug!(
        countries = db.country_count(),
        subdivisions = db.subdivision_count(),
        "territory database loaded"
    );
    Ok(TerritoryResolver::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_by_default() {
        let resolver = load_resolver(None).unwrap();
        assert!(resolver.is_supported("US-CA"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_resolver(Some(Path::new("/nonexistent/territories.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/territories.json"));
    }
}
