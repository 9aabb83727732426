//! # Containment Hierarchy
//!
//! Upward and downward walks over the subdivision tree. The dataset only
//! links children to parents, so the downward walk uses a parent → children
//! index built once per resolver.
//!
//! The tree is expected to be acyclic. Both walks still track the codes
//! they have visited and fail with [`TerritoryError::HierarchyCycle`]
//! instead of looping when a dataset breaks that expectation.

use std::collections::{BTreeMap, BTreeSet};

use postal_core::Territory;

use crate::error::TerritoryError;
use crate::resolver::TerritoryResolver;

impl TerritoryResolver {
    fn children_index(&self) -> &BTreeMap<String, Vec<String>> {
        self.children_index.get_or_init(|| {
            let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for subdivision in self.database().subdivisions() {
                if let Some(parent) = &subdivision.parent_code {
                    index
                        .entry(parent.clone())
                        .or_default()
                        .push(subdivision.code.clone());
                }
            }
            index
        })
    }

    /// Every subdivision code below a territory, at any depth.
    ///
    /// A country yields all of its subdivisions in one pass over the
    /// dataset; a subdivision yields its descendants at any depth. With
    /// `include_self` the normalized input is part of the result.
    ///
    /// # Errors
    ///
    /// Returns [`TerritoryError::UnrecognizedTerritory`] for unknown codes
    /// and [`TerritoryError::HierarchyCycle`] if a subdivision turns out to
    /// be its own ancestor.
    pub fn territory_children_codes(
        &self,
        code: &str,
        include_self: bool,
    ) -> Result<BTreeSet<String>, TerritoryError> {
        let code = self.normalize(code)?;
        let mut codes = BTreeSet::new();

        if self.is_country(&code) {
            codes.extend(
                self.database()
                    .subdivisions()
                    .filter(|s| s.country_code == code)
                    .map(|s| s.code.clone()),
            );
        } else {
            self.collect_descendants(&code, &mut codes)?;
        }

        if include_self {
            codes.insert(code);
        }
        Ok(codes)
    }

    /// Depth-first walk with an explicit stack. Every subdivision has a
    /// single parent, so reaching a code twice (or reaching the root again)
    /// means the parent links loop.
    fn collect_descendants(
        &self,
        root: &str,
        codes: &mut BTreeSet<String>,
    ) -> Result<(), TerritoryError> {
        let index = self.children_index();
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            let Some(children) = index.get(current) else {
                continue;
            };
            for child in children {
                if child == root || !codes.insert(child.clone()) {
                    return Err(TerritoryError::HierarchyCycle(child.clone()));
                }
                pending.push(child);
            }
        }
        Ok(())
    }

    /// The containment chain of a territory, from itself up to its country.
    ///
    /// A country yields itself (or nothing without `include_country`). A
    /// subdivision yields every subdivision from itself upward, followed by
    /// its country when `include_country` is set.
    ///
    /// # Errors
    ///
    /// Returns [`TerritoryError::UnrecognizedTerritory`] for unknown codes,
    /// [`TerritoryError::NotFound`] if a recognized code has no dataset
    /// entity (country-shaped aliases such as `IC`), and
    /// [`TerritoryError::HierarchyCycle`] on looping parent links.
    pub fn territory_parents(
        &self,
        code: &str,
        include_country: bool,
    ) -> Result<Vec<Territory>, TerritoryError> {
        let code = self.normalize(code)?;
        let db = self.database();
        let mut tree = Vec::new();

        if self.is_country(&code) {
            if include_country {
                tree.push(Territory::Country(db.country(&code)?.clone()));
            }
            return Ok(tree);
        }

        let mut visited = BTreeSet::new();
        let mut current = db.subdivision(&code)?;
        loop {
            if !visited.insert(current.code.as_str()) {
                return Err(TerritoryError::HierarchyCycle(current.code.clone()));
            }
            tree.push(Territory::Subdivision(current.clone()));
            match &current.parent_code {
                Some(parent) => current = db.subdivision(parent)?,
                None => break,
            }
        }

        if include_country {
            tree.push(Territory::Country(
                db.country(&current.country_code)?.clone(),
            ));
        }
        Ok(tree)
    }

    /// [`territory_parents`](Self::territory_parents) as plain codes.
    ///
    /// # Errors
    ///
    /// See [`territory_parents`](Self::territory_parents).
    pub fn territory_parents_codes(
        &self,
        code: &str,
        include_country: bool,
    ) -> Result<Vec<String>, TerritoryError> {
        Ok(self
            .territory_parents(code, include_country)?
            .iter()
            .map(|t| t.code().to_string())
            .collect())
    }
}
