//! # Country Equivalence
//!
//! Computes which country codes may legitimately stand in for a territory.
//! Used when deciding whether a user-supplied country code can be silently
//! replaced by the normalized one.
//!
//! The closure follows three kinds of edges from a code:
//!
//! - a subdivision to its parent (or to its country when top-level),
//! - a subdivision to the country code it overlaps with,
//! - a code to every code the reverse alias index lists for it.
//!
//! Every recognized country code reached along the way is an alias. The
//! reverse index is curated to be acyclic with respect to these edges, but
//! overlap edges and their inverses do form two-node loops (`CN-71 ⇄ TW`),
//! so the walk keeps a visited set.

use std::collections::BTreeSet;

use crate::aliases::alias_tables;
use crate::error::TerritoryError;
use crate::resolver::TerritoryResolver;

impl TerritoryResolver {
    /// Country codes equivalent to `code` for conflict checking.
    ///
    /// `code` is taken as stored (upper-case, no normalization).
    ///
    /// # Errors
    ///
    /// Returns [`TerritoryError::NotFound`] if `code` is a subdivision code
    /// missing from the dataset. Codes reached only through the alias
    /// tables are skipped when the dataset lacks them.
    pub fn country_aliases(&self, code: &str) -> Result<BTreeSet<String>, TerritoryError> {
        let tables = alias_tables();
        let mut aliases = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut pending = vec![code.to_string()];

        while let Some(current) = pending.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }

            if self.is_country(&current) {
                aliases.insert(current.clone());
            } else {
                match self.database().subdivision(&current) {
                    Ok(subdivision) => pending.push(
                        subdivision
                            .parent_code
                            .clone()
                            .unwrap_or_else(|| subdivision.country_code.clone()),
                    ),
                    Err(e) if current == code => return Err(e.into()),
                    Err(_) => {
                        tracing::debug!(
                            code = %current,
                            "alias table code missing from dataset, not walking its parents"
                        );
                    }
                }
                if let Some(country) = tables.subdivision_countries.get(current.as_str()) {
                    pending.push((*country).to_string());
                }
            }

            if let Some(sources) = tables.reverse_index.get(current.as_str()) {
                pending.extend(sources.iter().map(|s| (*s).to_string()));
            }
        }

        tracing::trace!(code = %code, aliases = ?aliases, "computed country aliases");
        Ok(aliases)
    }
}
