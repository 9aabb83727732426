//! # Territory Resolver
//!
//! [`TerritoryResolver`] owns a [`TerritoryDatabase`] and the code sets
//! derived from it. Every resolution operation is a method taking `&self`;
//! the only interior state is a handful of `OnceLock` caches, so a resolver
//! can be shared across threads without further synchronization.
//!
//! ## Normalization Order
//!
//! ```text
//! trim + upper-case
//!   └─▶ membership check          (UnrecognizedTerritory)
//!         └─▶ foreign-territory aliases   always
//!               └─▶ country aliases       always
//!                     └─▶ subdivision aliases      resolve_aliases
//!                           └─▶ subdivision/country overlaps  resolve_aliases
//!                                 └─▶ territory attachment    resolve_foreign_territory
//! ```
//!
//! The first two steps only fix spelling. The alias steps may change a
//! code's shape (subdivision → country) and the attachment step changes its
//! political meaning, hence the opt-in flags.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use postal_core::{DatasetError, InMemoryDatabase, TerritoryDatabase};

use crate::aliases::{alias_tables, resolve_in};
use crate::error::TerritoryError;

/// How aggressively [`TerritoryResolver::normalize_territory_code`] resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Apply subdivision aliases and subdivision/country overlaps.
    pub resolve_aliases: bool,
    /// Replace a dependent territory by the country it is attached to.
    pub resolve_foreign_territory: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            resolve_aliases: true,
            resolve_foreign_territory: false,
        }
    }
}

/// Resolution engine bound to one territory database.
pub struct TerritoryResolver {
    db: Box<dyn TerritoryDatabase>,
    country_codes: OnceLock<BTreeSet<String>>,
    subdivision_codes: OnceLock<BTreeSet<String>>,
    territory_codes: OnceLock<BTreeSet<String>>,
    recognized_codes: OnceLock<BTreeSet<String>>,
    pub(crate) children_index: OnceLock<BTreeMap<String, Vec<String>>>,
}

impl TerritoryResolver {
    /// Create a resolver over the given database.
    pub fn new(db: impl TerritoryDatabase + 'static) -> Self {
        Self {
            db: Box::new(db),
            country_codes: OnceLock::new(),
            subdivision_codes: OnceLock::new(),
            territory_codes: OnceLock::new(),
            recognized_codes: OnceLock::new(),
            children_index: OnceLock::new(),
        }
    }

    /// Create a resolver over the bundled ISO 3166 dataset.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled dataset is inconsistent.
    pub fn bundled() -> Result<Self, DatasetError> {
        Ok(Self::new(InMemoryDatabase::bundled()?))
    }

    /// The underlying territory database.
    pub fn database(&self) -> &dyn TerritoryDatabase {
        self.db.as_ref()
    }

    // ── Memoized code sets ──────────────────────────────────────────────

    /// Recognized country codes: ISO 3166-1 alpha-2 codes from the dataset,
    /// plus country aliases, exceptional reservations and country-shaped
    /// subdivision aliases.
    pub fn supported_country_codes(&self) -> &BTreeSet<String> {
        self.country_codes.get_or_init(|| {
            let tables = alias_tables();
            let codes: BTreeSet<String> = self
                .db
                .countries()
                .map(|c| c.alpha_2.clone())
                .chain(tables.extra_country_codes().map(str::to_string))
                .collect();
            tracing::debug!(count = codes.len(), "built supported country codes");
            codes
        })
    }

    /// Recognized ISO 3166-2 subdivision codes.
    pub fn supported_subdivision_codes(&self) -> &BTreeSet<String> {
        self.subdivision_codes.get_or_init(|| {
            let codes: BTreeSet<String> =
                self.db.subdivisions().map(|s| s.code.clone()).collect();
            tracing::debug!(count = codes.len(), "built supported subdivision codes");
            codes
        })
    }

    /// Union of supported country and subdivision codes.
    pub fn supported_territory_codes(&self) -> &BTreeSet<String> {
        self.territory_codes.get_or_init(|| {
            self.supported_country_codes()
                .union(self.supported_subdivision_codes())
                .cloned()
                .collect()
        })
    }

    /// Every code normalization accepts: supported territories plus every
    /// alias-table key.
    fn recognized_codes(&self) -> &BTreeSet<String> {
        self.recognized_codes.get_or_init(|| {
            let mut codes = self.supported_territory_codes().clone();
            codes.extend(alias_tables().keys().map(str::to_string));
            codes
        })
    }

    /// Whether normalization would accept `code` (after trim and
    /// upper-casing).
    pub fn is_supported(&self, code: &str) -> bool {
        self.recognized_codes()
            .contains(&code.trim().to_ascii_uppercase())
    }

    /// Whether `code` is a recognized country code, as stored.
    pub fn is_country(&self, code: &str) -> bool {
        self.supported_country_codes().contains(code)
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Normalize any string into a canonical territory code.
    ///
    /// # Errors
    ///
    /// Returns [`TerritoryError::UnrecognizedTerritory`] if the trimmed,
    /// upper-cased code is neither a dataset code nor an alias-table key.
    pub fn normalize_territory_code(
        &self,
        code: &str,
        options: NormalizeOptions,
    ) -> Result<String, TerritoryError> {
        let input = code.trim().to_ascii_uppercase();
        if !self.recognized_codes().contains(&input) {
            return Err(TerritoryError::UnrecognizedTerritory(input));
        }

        let tables = alias_tables();
        // Spelling corrections. Their keys are not dataset codes, so they
        // apply regardless of the options.
        let mut code = resolve_in(&tables.foreign_territory_aliases, input.clone());
        code = resolve_in(&tables.country_aliases, code);
        if options.resolve_aliases {
            code = resolve_in(&tables.subdivision_aliases, code);
            code = resolve_in(&tables.subdivision_countries, code);
        }
        if options.resolve_foreign_territory {
            code = self.territory_attachment(&code);
        }

        if code != input {
            tracing::trace!(input = %input, resolved = %code, "normalized territory code");
        }
        Ok(code)
    }

    /// [`normalize_territory_code`](Self::normalize_territory_code) with the
    /// default options (aliases resolved, attachments kept).
    ///
    /// # Errors
    ///
    /// See [`normalize_territory_code`](Self::normalize_territory_code).
    pub fn normalize(&self, code: &str) -> Result<String, TerritoryError> {
        self.normalize_territory_code(code, NormalizeOptions::default())
    }

    /// The country a dependent territory is politically attached to, or
    /// the input itself.
    pub fn territory_attachment(&self, country_code: &str) -> String {
        alias_tables()
            .attachments
            .get(country_code)
            .map_or_else(|| country_code.to_string(), |target| (*target).to_string())
    }

    /// The country code a subdivision belongs to.
    ///
    /// Subdivisions holding their own ISO 3166-1 code resolve to that code
    /// rather than the country of their ISO 3166-2 prefix. Subdivision
    /// aliases are followed first, so `NL-BQ1` answers `BQ` like the
    /// `BQ-BO` it stands for. Returns `None` when the input is not a
    /// recognized subdivision.
    pub fn country_from_subdivision(&self, subdivision_code: &str) -> Option<String> {
        let tables = alias_tables();
        let code = tables
            .subdivision_aliases
            .get(subdivision_code)
            .copied()
            .unwrap_or(subdivision_code);
        let code = tables
            .subdivision_countries
            .get(code)
            .copied()
            .unwrap_or(code);

        if self.is_country(code) {
            return Some(code.to_string());
        }

        match self.db.subdivision(code) {
            Ok(subdivision) => Some(subdivision.country_code.clone()),
            Err(e) => {
                tracing::debug!(code = %subdivision_code, error = %e, "no country for subdivision");
                None
            }
        }
    }

    /// Best-effort guess of a country's subdivision code.
    ///
    /// Only answers when exactly one subdivision maps onto the country
    /// through the overlap or country-alias tables; ambiguity yields `None`.
    pub fn default_subdivision_code(&self, country_code: &str) -> Option<String> {
        let candidates = alias_tables().default_subdivisions.get(country_code)?;
        match candidates.len() {
            1 => candidates.first().map(|code| (*code).to_string()),
            _ => None,
        }
    }
}

impl fmt::Debug for TerritoryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerritoryResolver")
            .field("country_codes_cached", &self.country_codes.get().is_some())
            .field(
                "subdivision_codes_cached",
                &self.subdivision_codes.get().is_some(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TerritoryResolver {
        TerritoryResolver::bundled().unwrap()
    }

    fn with(resolve_aliases: bool, resolve_foreign_territory: bool) -> NormalizeOptions {
        NormalizeOptions {
            resolve_aliases,
            resolve_foreign_territory,
        }
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        let r = resolver();
        assert_eq!(r.normalize("  fr ").unwrap(), "FR");
        assert_eq!(r.normalize("us-ca").unwrap(), "US-CA");
    }

    #[test]
    fn normalize_rejects_unknown_codes() {
        let r = resolver();
        assert_eq!(
            r.normalize("ZZ"),
            Err(TerritoryError::UnrecognizedTerritory("ZZ".into()))
        );
        assert!(r.normalize("").is_err());
        assert!(r.normalize("US-ZZ").is_err());
    }

    #[test]
    fn spelling_aliases_always_apply() {
        let r = resolver();
        let off = with(false, false);
        assert_eq!(r.normalize_territory_code("UK", off).unwrap(), "GB");
        assert_eq!(r.normalize_territory_code("el", off).unwrap(), "GR");
        assert_eq!(r.normalize_territory_code("FX", off).unwrap(), "FR");
        assert_eq!(r.normalize_territory_code("EA", off).unwrap(), "ES");
        assert_eq!(r.normalize_territory_code("DG", off).unwrap(), "IO");
    }

    #[test]
    fn shape_changing_aliases_are_opt_in() {
        let r = resolver();
        assert_eq!(
            r.normalize_territory_code("FR-MQ", with(false, false)).unwrap(),
            "FR-MQ"
        );
        assert_eq!(
            r.normalize_territory_code("FR-MQ", with(true, false)).unwrap(),
            "MQ"
        );
        assert_eq!(
            r.normalize_territory_code("NL-BQ2", with(true, false)).unwrap(),
            "BQ-SA"
        );
        assert_eq!(
            r.normalize_territory_code("NL-BQ2", with(false, false)).unwrap(),
            "NL-BQ2"
        );
    }

    #[test]
    fn foreign_territory_resolution_is_opt_in() {
        let r = resolver();
        assert_eq!(r.normalize_territory_code("GU", with(true, false)).unwrap(), "GU");
        assert_eq!(r.normalize_territory_code("GU", with(true, true)).unwrap(), "US");
        // Shape change then attachment: FR-MQ → MQ → FR.
        assert_eq!(r.normalize_territory_code("FR-MQ", with(true, true)).unwrap(), "FR");
        // Exceptional reservation then attachment: DG → IO → GB.
        assert_eq!(r.normalize_territory_code("DG", with(false, true)).unwrap(), "GB");
    }

    #[test]
    fn country_shaped_subdivision_aliases_are_recognized_but_kept() {
        let r = resolver();
        assert!(r.is_supported("ic"));
        assert_eq!(r.normalize("IC").unwrap(), "IC");
    }

    #[test]
    fn attachment_is_one_step() {
        let r = resolver();
        assert_eq!(r.territory_attachment("HK"), "CN");
        assert_eq!(r.territory_attachment("JE"), "GB");
        assert_eq!(r.territory_attachment("FR"), "FR");
        assert_eq!(r.territory_attachment("XX"), "XX");
    }

    #[test]
    fn country_from_subdivision_prefers_overlap() {
        let r = resolver();
        assert_eq!(r.country_from_subdivision("US-CA").as_deref(), Some("US"));
        assert_eq!(r.country_from_subdivision("US-PR").as_deref(), Some("PR"));
        assert_eq!(r.country_from_subdivision("CN-71").as_deref(), Some("TW"));
        assert_eq!(r.country_from_subdivision("FR-75").as_deref(), Some("FR"));
        assert_eq!(r.country_from_subdivision("NL-BQ1").as_deref(), Some("BQ"));
        assert_eq!(r.country_from_subdivision("NL-NH").as_deref(), Some("NL"));
    }

    #[test]
    fn country_from_subdivision_unknown_is_none() {
        let r = resolver();
        assert_eq!(r.country_from_subdivision("US-ZZ"), None);
        assert_eq!(r.country_from_subdivision("garbage"), None);
    }

    #[test]
    fn default_subdivision_needs_unique_candidate() {
        let r = resolver();
        assert_eq!(r.default_subdivision_code("TW").as_deref(), Some("CN-71"));
        assert_eq!(r.default_subdivision_code("PR").as_deref(), Some("US-PR"));
        assert_eq!(r.default_subdivision_code("AC").as_deref(), Some("SH-AC"));
        assert_eq!(r.default_subdivision_code("IC").as_deref(), Some("ES-CN"));
        // Svalbard and Jan Mayen both map to SJ.
        assert_eq!(r.default_subdivision_code("SJ"), None);
        assert_eq!(r.default_subdivision_code("US"), None);
        assert_eq!(r.default_subdivision_code("ZZ"), None);
    }

    #[test]
    fn supported_sets_include_aliases() {
        let r = resolver();
        let countries = r.supported_country_codes();
        for code in ["US", "FR", "UK", "EL", "DG", "FX", "EA", "AC", "CP", "IC", "TA"] {
            assert!(countries.contains(code), "{code} missing");
        }
        assert!(r.supported_subdivision_codes().contains("US-CA"));
        assert!(!r.supported_subdivision_codes().contains("US"));
        let all = r.supported_territory_codes();
        assert!(all.contains("US") && all.contains("US-CA"));
    }

    #[test]
    fn caches_are_computed_once() {
        let r = resolver();
        let a = r.supported_country_codes() as *const _;
        let b = r.supported_country_codes() as *const _;
        assert_eq!(a, b);
    }

    #[test]
    fn resolver_is_shareable_across_threads() {
        let r = resolver();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| r.normalize("fr-mq").unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), "MQ");
            }
        });
    }
}
