//! # In-Memory Territory Dataset
//!
//! Loads a dataset document (JSON or YAML) into an [`InMemoryDatabase`]
//! implementing [`TerritoryDatabase`]. The crate also bundles a curated ISO
//! 3166 dataset so the engine and CLI run without external files.
//!
//! ## Document Shape
//!
//! ```json
//! {
//!   "countries": [{ "alpha_2": "US", "name": "United States" }],
//!   "subdivisions": [
//!     { "code": "US-CA", "name": "California", "type": "State", "parent": null }
//!   ]
//! }
//! ```
//!
//! ## Consistency Checks
//!
//! Loading fails on duplicate codes, malformed subdivision codes,
//! subdivisions whose country prefix is not a dataset country, and parents
//! that are not dataset subdivisions. Parent cycles are not detected here;
//! the hierarchy walkers treat them as fatal when they meet one.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::database::TerritoryDatabase;
use crate::error::{DatasetError, LookupError, TerritoryKind};
use crate::territory::{Country, Subdivision};

/// The bundled ISO 3166 dataset document.
pub const BUNDLED_DATASET: &str = include_str!("../data/iso3166.json");

/// Serialized form of a dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetDocument {
    /// ISO 3166-1 countries.
    #[serde(default)]
    pub countries: Vec<Country>,
    /// ISO 3166-2 subdivisions.
    #[serde(default)]
    pub subdivisions: Vec<SubdivisionRecord>,
}

/// One subdivision as written in a dataset document.
///
/// The country code is not stored; it is the prefix of `code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubdivisionRecord {
    /// Full subdivision code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Human-readable type.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Parent subdivision code, absent or empty for top-level entries.
    #[serde(default)]
    pub parent: Option<String>,
}

/// A [`TerritoryDatabase`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    countries: BTreeMap<String, Country>,
    subdivisions: BTreeMap<String, Subdivision>,
}

impl InMemoryDatabase {
    /// Load the bundled ISO 3166 dataset.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled document itself is inconsistent.
    pub fn bundled() -> Result<Self, DatasetError> {
        Self::from_json(BUNDLED_DATASET)
    }

    /// Load a dataset from a file, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, fails to parse, or is inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(path)?;
        let db = match extension.as_str() {
            "json" => Self::from_json(&content)?,
            "yaml" | "yml" => Self::from_yaml(&content)?,
            _ => return Err(DatasetError::UnsupportedFormat { extension }),
        };
        tracing::debug!(
            path = %path.display(),
            countries = db.countries.len(),
            subdivisions = db.subdivisions.len(),
            "loaded territory dataset"
        );
        Ok(db)
    }

    /// Parse a JSON dataset document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the dataset is
    /// inconsistent.
    pub fn from_json(content: &str) -> Result<Self, DatasetError> {
        let document: DatasetDocument = serde_json::from_str(content)?;
        Self::from_document(document)
    }

    /// Parse a YAML dataset document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the dataset is
    /// inconsistent.
    pub fn from_yaml(content: &str) -> Result<Self, DatasetError> {
        let document: DatasetDocument = serde_yaml::from_str(content)?;
        Self::from_document(document)
    }

    /// Build a database from an already-parsed document.
    ///
    /// Codes are trimmed and upper-cased before indexing.
    ///
    /// # Errors
    ///
    /// Returns the first consistency violation found.
    pub fn from_document(document: DatasetDocument) -> Result<Self, DatasetError> {
        let mut countries = BTreeMap::new();
        for mut country in document.countries {
            country.alpha_2 = normalize_code(&country.alpha_2);
            if countries.contains_key(&country.alpha_2) {
                return Err(DatasetError::DuplicateCode {
                    kind: TerritoryKind::Country,
                    code: country.alpha_2,
                });
            }
            countries.insert(country.alpha_2.clone(), country);
        }

        let mut subdivisions = BTreeMap::new();
        for record in document.subdivisions {
            let code = normalize_code(&record.code);
            let parent = record
                .parent
                .map(|p| normalize_code(&p))
                .filter(|p| !p.is_empty());
            let subdivision = Subdivision::new(code.clone(), record.name, record.type_name, parent)
                .ok_or_else(|| DatasetError::MalformedSubdivisionCode(code.clone()))?;
            if !countries.contains_key(&subdivision.country_code) {
                return Err(DatasetError::UnknownCountry {
                    country: subdivision.country_code,
                    subdivision: code,
                });
            }
            if subdivisions.contains_key(&code) {
                return Err(DatasetError::DuplicateCode {
                    kind: TerritoryKind::Subdivision,
                    code,
                });
            }
            subdivisions.insert(code, subdivision);
        }

        // Parents may be declared after their children, so check once all
        // subdivisions are indexed.
        for subdivision in subdivisions.values() {
            if let Some(parent) = &subdivision.parent_code {
                if !subdivisions.contains_key(parent) {
                    return Err(DatasetError::UnknownParent {
                        subdivision: subdivision.code.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        Ok(Self {
            countries,
            subdivisions,
        })
    }

    /// Number of countries.
    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Number of subdivisions.
    pub fn subdivision_count(&self) -> usize {
        self.subdivisions.len()
    }
}

impl TerritoryDatabase for InMemoryDatabase {
    fn country(&self, alpha_2: &str) -> Result<&Country, LookupError> {
        self.countries
            .get(alpha_2)
            .ok_or_else(|| LookupError::country(alpha_2))
    }

    fn subdivision(&self, code: &str) -> Result<&Subdivision, LookupError> {
        self.subdivisions
            .get(code)
            .ok_or_else(|| LookupError::subdivision(code))
    }

    fn countries(&self) -> Box<dyn Iterator<Item = &Country> + '_> {
        Box::new(self.countries.values())
    }

    fn subdivisions(&self) -> Box<dyn Iterator<Item = &Subdivision> + '_> {
        Box::new(self.subdivisions.values())
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "countries": [
            {"alpha_2": "fr", "name": "France"},
            {"alpha_2": "US", "name": "United States"}
        ],
        "subdivisions": [
            {"code": "FR-75", "name": "Paris", "type": "Metropolitan department", "parent": "FR-IDF"},
            {"code": "FR-IDF", "name": "Île-de-France", "type": "Metropolitan region"},
            {"code": "us-ca", "name": "California", "type": "State", "parent": ""}
        ]
    }"#;

    #[test]
    fn loads_and_normalizes_codes() {
        let db = InMemoryDatabase::from_json(SMALL).unwrap();
        assert_eq!(db.country_count(), 2);
        assert_eq!(db.subdivision_count(), 3);
        assert_eq!(db.country("FR").unwrap().name, "France");
        let ca = db.subdivision("US-CA").unwrap();
        assert_eq!(ca.country_code, "US");
        assert!(ca.parent_code.is_none());
        let paris = db.subdivision("FR-75").unwrap();
        assert_eq!(paris.parent_code.as_deref(), Some("FR-IDF"));
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let db = InMemoryDatabase::from_json(SMALL).unwrap();
        assert_eq!(db.country("ZZ"), Err(LookupError::country("ZZ")));
        assert_eq!(
            db.subdivision("US-ZZ"),
            Err(LookupError::subdivision("US-ZZ"))
        );
    }

    #[test]
    fn rejects_duplicate_country() {
        let doc = r#"{"countries": [
            {"alpha_2": "FR", "name": "France"},
            {"alpha_2": "fr", "name": "France again"}
        ]}"#;
        assert!(matches!(
            InMemoryDatabase::from_json(doc),
            Err(DatasetError::DuplicateCode { kind: TerritoryKind::Country, .. })
        ));
    }

    #[test]
    fn rejects_unknown_country_prefix() {
        let doc = r#"{"countries": [], "subdivisions": [
            {"code": "US-CA", "name": "California", "type": "State"}
        ]}"#;
        assert!(matches!(
            InMemoryDatabase::from_json(doc),
            Err(DatasetError::UnknownCountry { .. })
        ));
    }

    #[test]
    fn rejects_dangling_parent() {
        let doc = r#"{"countries": [{"alpha_2": "FR", "name": "France"}], "subdivisions": [
            {"code": "FR-75", "name": "Paris", "type": "Metropolitan department", "parent": "FR-IDF"}
        ]}"#;
        match InMemoryDatabase::from_json(doc) {
            Err(DatasetError::UnknownParent { subdivision, parent }) => {
                assert_eq!(subdivision, "FR-75");
                assert_eq!(parent, "FR-IDF");
            }
            other => panic!("expected UnknownParent, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_subdivision_code() {
        let doc = r#"{"countries": [{"alpha_2": "FR", "name": "France"}], "subdivisions": [
            {"code": "FR75", "name": "Paris", "type": "Metropolitan department"}
        ]}"#;
        assert!(matches!(
            InMemoryDatabase::from_json(doc),
            Err(DatasetError::MalformedSubdivisionCode(_))
        ));
    }

    #[test]
    fn yaml_document_loads() {
        let doc = "countries:\n  - alpha_2: SJ\n    name: Svalbard and Jan Mayen\n";
        let db = InMemoryDatabase::from_yaml(doc).unwrap();
        assert_eq!(db.country("SJ").unwrap().name, "Svalbard and Jan Mayen");
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("dataset.json");
        std::fs::write(&json_path, SMALL).unwrap();
        assert_eq!(InMemoryDatabase::from_file(&json_path).unwrap().country_count(), 2);

        let yaml_path = dir.path().join("dataset.yml");
        std::fs::write(&yaml_path, "countries:\n  - alpha_2: US\n    name: United States\n")
            .unwrap();
        assert_eq!(InMemoryDatabase::from_file(&yaml_path).unwrap().country_count(), 1);

        let txt_path = dir.path().join("dataset.txt");
        std::fs::write(&txt_path, SMALL).unwrap();
        assert!(matches!(
            InMemoryDatabase::from_file(&txt_path),
            Err(DatasetError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn bundled_dataset_is_consistent() {
        let db = InMemoryDatabase::bundled().unwrap();
        assert!(db.country_count() > 240);
        assert_eq!(db.country("US").unwrap().name, "United States");
        assert_eq!(db.subdivision("US-CA").unwrap().name, "California");
    }
}
