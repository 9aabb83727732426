//! # Territory Alias Tables
//!
//! Static, process-wide mappings that correct or re-shape territory codes
//! the ISO 3166 dataset alone cannot resolve. The tables are compile-time
//! constant data; the indexed form ([`AliasTables`]) is built once on first
//! use and shared read-only afterwards.
//!
//! ## Tables
//!
//! | Table | Direction | Applied by normalization |
//! |-------|-----------|--------------------------|
//! | [`FOREIGN_TERRITORY_ALIASES`] | reservation → country | always |
//! | [`COUNTRY_ALIASES`] | colloquial → ISO country | always |
//! | [`SUBDIVISION_ALIASES`] | subdivision → subdivision | with alias resolution |
//! | [`SUBDIVISION_COUNTRY_OVERLAPS`] | subdivision → own country code | with alias resolution |
//! | [`TERRITORY_ATTACHMENTS`] | dependent country → parent country | with foreign resolution |
//! | [`COUNTRY_ALIAS_TO_SUBDIVISION`] | country-shaped alias → subdivision | never (default guesses only) |
//!
//! ## Invariants
//!
//! - The alias graph formed by every table except the attachments is
//!   acyclic, so resolution terminates.
//! - Resolving through the alias tables is idempotent.
//!
//! Both are checked by the tests at the bottom of this module.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Country codes in common use that ISO 3166-1 assigns differently.
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    // United Kingdom is GB in ISO 3166-1.
    ("UK", "GB"),
    // EL is the European Union code for Greece.
    ("EL", "GR"),
];

/// Exceptionally reserved ISO 3166-1 codes and the country they belong to.
pub const FOREIGN_TERRITORY_ALIASES: &[(&str, &str)] = &[
    // Diego Garcia, part of the British Indian Ocean Territory.
    ("DG", "IO"),
    // France, Metropolitan.
    ("FX", "FR"),
    // Ceuta and Melilla, European Commission code.
    ("EA", "ES"),
];

/// Subdivisions that also hold their own ISO 3166-1 alpha-2 code.
pub const SUBDIVISION_COUNTRY_OVERLAPS: &[(&str, &str)] = &[
    ("CN-71", "TW"),  // Taiwan
    ("CN-91", "HK"),  // Hong Kong
    ("CN-92", "MO"),  // Macao
    ("FI-01", "AX"),  // Åland
    ("FR-BL", "BL"),  // Saint Barthélemy
    ("FR-GF", "GF"),  // French Guiana
    ("FR-GP", "GP"),  // Guadeloupe
    ("FR-MF", "MF"),  // Saint Martin
    ("FR-MQ", "MQ"),  // Martinique
    ("FR-NC", "NC"),  // New Caledonia
    ("FR-PF", "PF"),  // French Polynesia
    ("FR-PM", "PM"),  // Saint Pierre and Miquelon
    ("FR-RE", "RE"),  // Réunion
    ("FR-TF", "TF"),  // French Southern Territories
    ("FR-WF", "WF"),  // Wallis and Futuna
    ("FR-YT", "YT"),  // Mayotte
    ("NL-AW", "AW"),  // Aruba
    ("NL-CW", "CW"),  // Curaçao
    ("NL-SX", "SX"),  // Sint Maarten
    ("NO-21", "SJ"),  // Svalbard
    ("NO-22", "SJ"),  // Jan Mayen
    ("US-AS", "AS"),  // American Samoa
    ("US-GU", "GU"),  // Guam
    ("US-MP", "MP"),  // Northern Mariana Islands
    ("US-PR", "PR"),  // Puerto Rico
    ("US-UM", "UM"),  // United States Minor Outlying Islands
    ("US-VI", "VI"),  // Virgin Islands, U.S.
];

/// The same territory coded under two different countries.
pub const SUBDIVISION_ALIASES: &[(&str, &str)] = &[
    ("NL-BQ1", "BQ-BO"), // Bonaire
    ("NL-BQ2", "BQ-SA"), // Saba
    ("NL-BQ3", "BQ-SE"), // Sint Eustatius
];

/// Dependent territories and the country they are politically attached to.
///
/// This is not a spelling correction: `GU` is a valid code, it just
/// denotes a territory of `US`.
pub const TERRITORY_ATTACHMENTS: &[(&str, &str)] = &[
    ("CC", "AU"), // Cocos Islands
    ("HM", "AU"), // Heard Island and McDonald Islands
    ("HK", "CN"), // Hong Kong
    ("MO", "CN"), // Macao
    ("FO", "DK"), // Faroe Islands
    ("AX", "FI"), // Åland
    ("AQ", "FR"), // Antarctica
    ("BL", "FR"), // Saint Barthélemy
    ("GF", "FR"), // French Guiana
    ("GP", "FR"), // Guadeloupe
    ("MF", "FR"), // Saint Martin
    ("MQ", "FR"), // Martinique
    ("NC", "FR"), // New Caledonia
    ("PF", "FR"), // French Polynesia
    ("PM", "FR"), // Saint Pierre and Miquelon
    ("RE", "FR"), // Réunion
    ("TF", "FR"), // French Southern Territories
    ("WF", "FR"), // Wallis and Futuna
    ("YT", "FR"), // Mayotte
    ("GI", "GB"), // Gibraltar
    ("IM", "GB"), // Isle of Man
    ("IO", "GB"), // British Indian Ocean Territory
    ("JE", "GB"), // Jersey
    ("PN", "GB"), // Pitcairn
    ("SH", "GB"), // Saint Helena
    ("VG", "GB"), // British Virgin Islands
    ("BQ", "NL"), // Bonaire, Sint Eustatius and Saba
    ("SX", "NL"), // Sint Maarten
    ("BV", "NO"), // Bouvet Island
    ("SJ", "NO"), // Svalbard and Jan Mayen
    ("AS", "US"), // American Samoa
    ("GU", "US"), // Guam
    ("MP", "US"), // Northern Mariana Islands
    ("VI", "US"), // Virgin Islands, U.S.
];

/// Country-shaped codes that actually denote one subdivision.
pub const COUNTRY_ALIAS_TO_SUBDIVISION: &[(&str, &str)] = &[
    ("AC", "SH-AC"), // Ascension Island
    ("CP", "FR-CP"), // Clipperton Island
    ("IC", "ES-CN"), // Canary Islands
    ("TA", "SH-TA"), // Tristan da Cunha
];

type Table = BTreeMap<&'static str, &'static str>;
type Index = BTreeMap<&'static str, BTreeSet<&'static str>>;

/// Indexed form of every alias table, plus the derived lookups.
#[derive(Debug)]
pub struct AliasTables {
    /// [`COUNTRY_ALIASES`] indexed by alias.
    pub country_aliases: Table,
    /// [`FOREIGN_TERRITORY_ALIASES`] indexed by reservation code.
    pub foreign_territory_aliases: Table,
    /// [`SUBDIVISION_COUNTRY_OVERLAPS`] indexed by subdivision.
    pub subdivision_countries: Table,
    /// [`SUBDIVISION_ALIASES`] indexed by alias.
    pub subdivision_aliases: Table,
    /// [`TERRITORY_ATTACHMENTS`] indexed by dependent territory.
    pub attachments: Table,
    /// [`COUNTRY_ALIAS_TO_SUBDIVISION`] indexed by country-shaped alias.
    pub country_alias_subdivisions: Table,
    /// Target code → every code that resolves to it, across all tables
    /// except the attachments.
    pub reverse_index: Index,
    /// Country code → candidate default subdivisions.
    pub default_subdivisions: Index,
}

impl AliasTables {
    fn build() -> Self {
        let country_aliases: Table = COUNTRY_ALIASES.iter().copied().collect();
        let foreign_territory_aliases: Table = FOREIGN_TERRITORY_ALIASES.iter().copied().collect();
        let subdivision_countries: Table = SUBDIVISION_COUNTRY_OVERLAPS.iter().copied().collect();
        let subdivision_aliases: Table = SUBDIVISION_ALIASES.iter().copied().collect();
        let attachments: Table = TERRITORY_ATTACHMENTS.iter().copied().collect();
        let country_alias_subdivisions: Table =
            COUNTRY_ALIAS_TO_SUBDIVISION.iter().copied().collect();

        let mut reverse_index = Index::new();
        for table in [
            COUNTRY_ALIASES,
            FOREIGN_TERRITORY_ALIASES,
            SUBDIVISION_COUNTRY_OVERLAPS,
            SUBDIVISION_ALIASES,
            COUNTRY_ALIAS_TO_SUBDIVISION,
        ] {
            for &(alias, target) in table {
                reverse_index.entry(target).or_default().insert(alias);
            }
        }

        let mut default_subdivisions = Index::new();
        for &(subdivision, country) in SUBDIVISION_COUNTRY_OVERLAPS {
            if is_country_shaped(country) {
                default_subdivisions
                    .entry(country)
                    .or_default()
                    .insert(subdivision);
            }
        }
        for &(country, subdivision) in COUNTRY_ALIAS_TO_SUBDIVISION {
            default_subdivisions
                .entry(country)
                .or_default()
                .insert(subdivision);
        }

        Self {
            country_aliases,
            foreign_territory_aliases,
            subdivision_countries,
            subdivision_aliases,
            attachments,
            country_alias_subdivisions,
            reverse_index,
            default_subdivisions,
        }
    }

    /// Every code appearing as a key of any table.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.country_aliases
            .keys()
            .chain(self.foreign_territory_aliases.keys())
            .chain(self.subdivision_countries.keys())
            .chain(self.subdivision_aliases.keys())
            .chain(self.attachments.keys())
            .chain(self.country_alias_subdivisions.keys())
            .copied()
    }

    /// Country-shaped codes the tables recognize on top of the dataset.
    pub fn extra_country_codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.country_aliases
            .keys()
            .chain(self.foreign_territory_aliases.keys())
            .chain(self.country_alias_subdivisions.keys())
            .copied()
    }
}

/// The process-wide alias tables, built on first access.
pub fn alias_tables() -> &'static AliasTables {
    static TABLES: OnceLock<AliasTables> = OnceLock::new();
    TABLES.get_or_init(AliasTables::build)
}

/// Look `code` up in `table`, returning the input unchanged on a miss.
pub(crate) fn resolve_in(table: &Table, code: String) -> String {
    match table.get(code.as_str()) {
        Some(target) => (*target).to_string(),
        None => code,
    }
}

/// Whether a code has the two-letter country shape.
pub fn is_country_shaped(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase())
}
