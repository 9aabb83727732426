//! # Resolution Properties over the Bundled Dataset
//!
//! Exhaustive and property-based checks of the resolution engine's
//! contracts: idempotent normalization, agreement between the country
//! lookup and the parent chain, uniqueness of default subdivisions, and
//! consistency between the downward and upward hierarchy walks.

use std::sync::OnceLock;

use postal_territory::aliases::{alias_tables, SUBDIVISION_COUNTRY_OVERLAPS};
use postal_territory::{NormalizeOptions, TerritoryResolver};
use proptest::prelude::*;

fn resolver() -> &'static TerritoryResolver {
    static RESOLVER: OnceLock<TerritoryResolver> = OnceLock::new();
    RESOLVER.get_or_init(|| TerritoryResolver::bundled().expect("bundled dataset loads"))
}

/// Every code normalization accepts.
fn recognized_codes() -> Vec<String> {
    let r = resolver();
    let mut codes: Vec<String> = r.supported_territory_codes().iter().cloned().collect();
    codes.extend(alias_tables().keys().map(str::to_string));
    codes.sort();
    codes.dedup();
    codes
}

fn subdivision_codes() -> Vec<String> {
    resolver()
        .supported_subdivision_codes()
        .iter()
        .cloned()
        .collect()
}

const ALL_OPTIONS: [NormalizeOptions; 4] = [
    NormalizeOptions {
        resolve_aliases: false,
        resolve_foreign_territory: false,
    },
    NormalizeOptions {
        resolve_aliases: true,
        resolve_foreign_territory: false,
    },
    NormalizeOptions {
        resolve_aliases: false,
        resolve_foreign_territory: true,
    },
    NormalizeOptions {
        resolve_aliases: true,
        resolve_foreign_territory: true,
    },
];

#[test]
fn normalization_is_idempotent_for_every_code() {
    let r = resolver();
    for code in recognized_codes() {
        for options in ALL_OPTIONS {
            let once = r
                .normalize_territory_code(&code, options)
                .unwrap_or_else(|e| panic!("{code}: {e}"));
            let twice = r
                .normalize_territory_code(&once, options)
                .unwrap_or_else(|e| panic!("{code} -> {once}: {e}"));
            assert_eq!(once, twice, "{code} with {options:?}");
        }
    }
}

#[test]
fn country_from_subdivision_matches_parent_chain() {
    let r = resolver();
    for code in subdivision_codes() {
        let country = r
            .country_from_subdivision(&code)
            .unwrap_or_else(|| panic!("{code} has no country"));
        let chain = r.territory_parents(&code, true).unwrap();
        let last = chain.last().unwrap_or_else(|| panic!("{code} has empty chain"));
        assert_eq!(last.code(), country, "{code}");
    }
}

#[test]
fn default_subdivision_only_for_unique_overlaps() {
    let r = resolver();
    for country in r.supported_country_codes() {
        let overlaps: Vec<&str> = SUBDIVISION_COUNTRY_OVERLAPS
            .iter()
            .filter(|(_, target)| target == country)
            .map(|(subdivision, _)| *subdivision)
            .collect();
        let aliased = alias_tables().country_alias_subdivisions.get(country.as_str());
        let guess = r.default_subdivision_code(country);
        match (overlaps.as_slice(), aliased) {
            ([only], None) => assert_eq!(guess.as_deref(), Some(*only), "{country}"),
            ([], Some(subdivision)) => assert_eq!(guess.as_deref(), Some(*subdivision)),
            _ => assert_eq!(guess, None, "{country}"),
        }
    }
}

#[test]
fn children_are_consistent_with_parents() {
    let r = resolver();
    for code in subdivision_codes() {
        // Overlap and alias keys normalize to another territory first.
        let parent = r.normalize(&code).unwrap();
        if r.is_country(&parent) {
            continue;
        }
        for child in r.territory_children_codes(&parent, false).unwrap() {
            let chain = r.territory_parents_codes(&child, false).unwrap();
            assert!(
                chain.contains(&parent),
                "{parent} missing from parents of {child}: {chain:?}"
            );
        }
    }
}

#[test]
fn country_children_lead_back_to_country() {
    let r = resolver();
    let tables = alias_tables();
    for country in ["US", "FR", "ES", "GB", "NL"] {
        for child in r.territory_children_codes(country, false).unwrap() {
            if tables.subdivision_countries.contains_key(child.as_str())
                || tables.subdivision_aliases.contains_key(child.as_str())
            {
                continue;
            }
            let chain = r.territory_parents_codes(&child, true).unwrap();
            assert_eq!(chain.last().map(String::as_str), Some(country), "{child}");
        }
    }
}

#[test]
fn every_subdivision_aliases_include_its_country() {
    let r = resolver();
    for code in subdivision_codes() {
        if alias_tables().subdivision_aliases.contains_key(code.as_str()) {
            // NL-BQ1 and friends answer BQ but only reach NL upward.
            continue;
        }
        let aliases = r.country_aliases(&code).unwrap();
        let country = r.country_from_subdivision(&code).unwrap();
        assert!(aliases.contains(&country), "{code}: {aliases:?} lacks {country}");
    }
}

proptest! {
    #[test]
    fn normalization_ignores_case_and_whitespace(
        code in proptest::sample::select(recognized_codes()),
        lower in any::<bool>(),
        left in "[ \t]{0,3}",
        right in "[ \t]{0,3}",
    ) {
        let r = resolver();
        let raw = if lower { code.to_lowercase() } else { code.clone() };
        let padded = format!("{left}{raw}{right}");
        prop_assert_eq!(r.normalize(&padded).unwrap(), r.normalize(&code).unwrap());
    }

    #[test]
    fn unknown_codes_are_rejected(code in "[A-Z]{2}-[0-9]{4}") {
        // No ISO 3166-2 code in the dataset has a four-digit region.
        prop_assert!(resolver().normalize(&code).is_err());
    }

    #[test]
    fn children_include_self_adds_exactly_the_input(
        code in proptest::sample::select(subdivision_codes()),
    ) {
        let r = resolver();
        let without = r.territory_children_codes(&code, false).unwrap();
        let with = r.territory_children_codes(&code, true).unwrap();
        let normalized = r.normalize(&code).unwrap();
        prop_assert!(with.contains(&normalized));
        prop_assert_eq!(with.len(), without.len() + usize::from(!without.contains(&normalized)));
    }
}
