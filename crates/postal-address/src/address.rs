//! # Postal Address
//!
//! An [`Address`] is a map of components bound to the
//! [`TerritoryResolver`] that normalizes it. Callers set only the base
//! components ([`ComponentId`]); normalization adds the metadata derived
//! from the subdivision and its ancestors.
//!
//! ## Lifecycle
//!
//! ```text
//! new / from_fields ──normalize()──▶ normalized ──validate()──▶ Ok / ValidationError
//! ```
//!
//! Normalization runs once during construction and again whenever the
//! caller asks for it after editing components. Each run starts from the
//! base components alone, so metadata derived from a previous subdivision
//! never survives an edit. It fails fast: cleanup steps already applied
//! stay applied, but conflicting metadata is never merged. Validation and
//! rendering only read.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use postal_core::{Country, Subdivision, Territory};
use postal_territory::TerritoryResolver;
use serde::{Deserialize, Serialize, Serializer};

use crate::component::{ComponentId, ComponentValue};
use crate::error::{AddressError, ValidationError};
use crate::metadata::{subdivision_metadata, subdivision_type_id};

/// Base components as plain optional fields, for deserializing input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdivision_code: Option<String>,
}

impl AddressFields {
    fn into_components(self) -> impl Iterator<Item = (ComponentId, String)> {
        [
            (ComponentId::Line1, self.line1),
            (ComponentId::Line2, self.line2),
            (ComponentId::PostalCode, self.postal_code),
            (ComponentId::CityName, self.city_name),
            (ComponentId::CountryCode, self.country_code),
            (ComponentId::SubdivisionCode, self.subdivision_code),
        ]
        .into_iter()
        .filter_map(|(id, value)| value.map(|v| (id, v)))
    }
}

/// A normalized postal address.
#[derive(Clone)]
pub struct Address<'r> {
    resolver: &'r TerritoryResolver,
    components: BTreeMap<String, ComponentValue>,
}

macro_rules! base_component_accessors {
    ($($get:ident, $set:ident => $id:ident;)*) => {
        $(
            #[doc = concat!("The `", stringify!($get), "` component.")]
            pub fn $get(&self) -> Option<&str> {
                self.text(ComponentId::$id)
            }

            #[doc = concat!("Set `", stringify!($get), "` without re-normalizing.")]
            pub fn $set(&mut self, value: impl Into<String>) {
                self.components.insert(
                    ComponentId::$id.as_str().to_string(),
                    ComponentValue::Text(value.into()),
                );
            }
        )*
    };
}

impl<'r> Address<'r> {
    /// Build an address from base components and normalize it.
    ///
    /// # Errors
    ///
    /// [`AddressError::UnknownComponent`] if an identifier is not a base
    /// component; otherwise any error from [`normalize`](Self::normalize).
    pub fn new<I, K, V>(
        resolver: &'r TerritoryResolver,
        components: I,
    ) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut address = Self {
            resolver,
            components: BTreeMap::new(),
        };
        for (id, value) in components {
            let id: ComponentId = id.as_ref().parse()?;
            address
                .components
                .insert(id.as_str().to_string(), ComponentValue::Text(value.into()));
        }
        address.normalize()?;
        Ok(address)
    }

    /// Build an address from deserialized fields and normalize it.
    ///
    /// # Errors
    ///
    /// See [`normalize`](Self::normalize).
    pub fn from_fields(
        resolver: &'r TerritoryResolver,
        fields: AddressFields,
    ) -> Result<Self, AddressError> {
        Self::new(
            resolver,
            fields.into_components().map(|(id, value)| (id.as_str(), value)),
        )
    }

    /// The resolver this address normalizes against.
    pub fn resolver(&self) -> &'r TerritoryResolver {
        self.resolver
    }

    // ── Normalization ───────────────────────────────────────────────────

    /// Clean up components and merge the metadata derived from the
    /// subdivision.
    ///
    /// Previously derived metadata is discarded first and rebuilt from the
    /// current `subdivision_code`.
    ///
    /// # Errors
    ///
    /// [`AddressError::ConflictingTerritoryMetadata`] if a derived value
    /// would replace a different, non-equivalent value already set.
    /// [`AddressError::Territory`] if the subdivision hierarchy is broken.
    pub fn normalize(&mut self) -> Result<(), AddressError> {
        self.components
            .retain(|id, value| ComponentId::is_base(id) && !value.is_blank());
        for value in self.components.values_mut() {
            if let ComponentValue::Text(text) = value {
                let trimmed = text.trim();
                if trimmed.len() != text.len() {
                    *text = trimmed.to_string();
                }
            }
        }

        for id in [ComponentId::CountryCode, ComponentId::SubdivisionCode] {
            if let Some(ComponentValue::Text(code)) = self.components.get_mut(id.as_str()) {
                *code = code.to_uppercase();
            }
        }

        if !self.has(ComponentId::Line1) {
            if let Some(line2) = self.components.remove(ComponentId::Line2.as_str()) {
                self.components
                    .insert(ComponentId::Line1.as_str().to_string(), line2);
            }
        }

        if !self.has(ComponentId::SubdivisionCode) {
            let guess = self
                .country_code()
                .and_then(|country| self.resolver.default_subdivision_code(country));
            if let Some(subdivision) = guess {
                tracing::debug!(subdivision = %subdivision, "guessed default subdivision");
                self.set_subdivision_code(subdivision);
            }
        }

        let Some(subdivision) = self.subdivision_code().map(str::to_string) else {
            return Ok(());
        };
        if self.resolver.database().subdivision(&subdivision).is_err() {
            tracing::debug!(subdivision = %subdivision, "unknown subdivision, no metadata derived");
            return Ok(());
        }

        let derived = self.derive_metadata(&subdivision)?;
        self.check_conflicts(&subdivision, &derived)?;
        tracing::debug!(
            subdivision = %subdivision,
            components = derived.len(),
            "merged subdivision metadata"
        );
        self.components.extend(derived);
        Ok(())
    }

    /// Country code plus the metadata of every subdivision from
    /// `subdivision` upward. Higher levels win on identical keys.
    fn derive_metadata(
        &self,
        subdivision: &str,
    ) -> Result<BTreeMap<String, ComponentValue>, AddressError> {
        let mut derived = BTreeMap::new();
        if let Some(country) = self.resolver.country_from_subdivision(subdivision) {
            derived.insert(
                ComponentId::CountryCode.as_str().to_string(),
                ComponentValue::Text(country),
            );
        }
        for territory in self.resolver.territory_parents(subdivision, false)? {
            if let Territory::Subdivision(parent) = territory {
                derived.extend(subdivision_metadata(&parent));
            }
        }
        Ok(derived)
    }

    fn check_conflicts(
        &self,
        subdivision: &str,
        derived: &BTreeMap<String, ComponentValue>,
    ) -> Result<(), AddressError> {
        let mut country_aliases: Option<BTreeSet<String>> = None;

        for (id, new_value) in derived {
            if !ComponentId::is_base(id) {
                continue;
            }
            let Some(current) = self.components.get(id) else {
                continue;
            };
            if current == new_value {
                continue;
            }
            if id == ComponentId::CountryCode.as_str() {
                if country_aliases.is_none() {
                    country_aliases = Some(self.resolver.country_aliases(subdivision)?);
                }
                let is_alias = match (&country_aliases, current.as_text()) {
                    (Some(aliases), Some(code)) => aliases.contains(code),
                    _ => false,
                };
                if is_alias {
                    continue;
                }
            }
            return Err(AddressError::ConflictingTerritoryMetadata {
                subdivision: subdivision.to_string(),
                component: id.clone(),
                current: current.to_string(),
                derived: new_value.to_string(),
            });
        }
        Ok(())
    }

    // ── Validation ──────────────────────────────────────────────────────

    /// Check the address for consistency and completeness.
    ///
    /// # Errors
    ///
    /// The first failing check, in this order: unknown subdivision,
    /// unknown country, country not the parent of the subdivision, then
    /// the first missing required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let db = self.resolver.database();

        if let Some(subdivision) = self.subdivision_code() {
            if db.subdivision(subdivision).is_err() {
                return Err(ValidationError::InvalidSubdivisionCode(subdivision.to_string()));
            }
        }

        if let Some(country) = self.country_code() {
            if db.country(country).is_err() {
                return Err(ValidationError::InvalidCountryCode(country.to_string()));
            }
        }

        if let (Some(country), Some(subdivision)) = (self.country_code(), self.subdivision_code()) {
            if self.resolver.country_from_subdivision(subdivision).as_deref() != Some(country) {
                return Err(ValidationError::CountrySubdivisionMismatch {
                    country: country.to_string(),
                    subdivision: subdivision.to_string(),
                });
            }
        }

        for id in ComponentId::required() {
            if !self.has(*id) {
                return Err(ValidationError::MissingRequiredField(*id));
            }
        }
        Ok(())
    }

    /// Whether [`validate`](Self::validate) passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    // ── Rendering ───────────────────────────────────────────────────────

    /// Render the address block with lines joined by `separator`.
    ///
    /// Street lines as-is, then `postal_code - city_name, state`, then the
    /// country's display name. Empty parts are left out.
    pub fn render(&self, separator: &str) -> String {
        let mut lines: Vec<&str> = Vec::with_capacity(4);
        lines.extend(self.line1());
        lines.extend(self.line2());

        let locality: Vec<&str> = [self.city_name(), self.get_text("state_name")]
            .into_iter()
            .flatten()
            .collect();
        let locality = locality.join(", ");
        let line3 = [self.postal_code(), Some(locality.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" - ");
        if !line3.is_empty() {
            lines.push(&line3);
        }

        lines.extend(self.country_name());
        lines.join(separator)
    }

    // ── Component access ────────────────────────────────────────────────

    /// Value of any component, base or derived.
    pub fn get(&self, id: &str) -> Option<&ComponentValue> {
        self.components.get(id)
    }

    /// Text value of any component.
    pub fn get_text(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(ComponentValue::as_text)
    }

    /// Set a base component without re-normalizing.
    ///
    /// # Errors
    ///
    /// [`AddressError::UnknownComponent`] for identifiers outside the base
    /// set.
    pub fn set(&mut self, id: &str, value: impl Into<String>) -> Result<(), AddressError> {
        let id: ComponentId = id.parse()?;
        self.components
            .insert(id.as_str().to_string(), ComponentValue::Text(value.into()));
        Ok(())
    }

    /// Remove a component, base or derived.
    pub fn remove(&mut self, id: &str) -> Option<ComponentValue> {
        self.components.remove(id)
    }

    /// Components in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentValue)> {
        self.components.iter().map(|(id, value)| (id.as_str(), value))
    }

    /// Identifiers of the set components.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True iff no component holds a non-blank value.
    pub fn is_empty(&self) -> bool {
        self.components.values().all(ComponentValue::is_blank)
    }

    pub fn components(&self) -> &BTreeMap<String, ComponentValue> {
        &self.components
    }

    base_component_accessors! {
        line1, set_line1 => Line1;
        line2, set_line2 => Line2;
        postal_code, set_postal_code => PostalCode;
        city_name, set_city_name => CityName;
        country_code, set_country_code => CountryCode;
        subdivision_code, set_subdivision_code => SubdivisionCode;
    }

    fn text(&self, id: ComponentId) -> Option<&str> {
        self.get_text(id.as_str())
    }

    fn has(&self, id: ComponentId) -> bool {
        self.text(id).is_some_and(|text| !text.trim().is_empty())
    }

    // ── Territory entities ──────────────────────────────────────────────

    /// The country entity, if the country code is in the database.
    pub fn country(&self) -> Option<&'r Country> {
        let db = self.resolver.database();
        self.country_code().and_then(|code| db.country(code).ok())
    }

    pub fn country_name(&self) -> Option<&'r str> {
        self.country().map(|country| country.name.as_str())
    }

    /// The subdivision entity, if the subdivision code is in the database.
    pub fn subdivision(&self) -> Option<&'r Subdivision> {
        let db = self.resolver.database();
        self.subdivision_code()
            .and_then(|code| db.subdivision(code).ok())
    }

    pub fn subdivision_name(&self) -> Option<&'r str> {
        self.subdivision().map(|s| s.name.as_str())
    }

    pub fn subdivision_type_name(&self) -> Option<&'r str> {
        self.subdivision().map(|s| s.type_name.as_str())
    }

    /// Metadata identifier of the subdivision's type, e.g. `"state"`.
    pub fn subdivision_type_id(&self) -> Option<String> {
        self.subdivision().map(subdivision_type_id)
    }
}

impl fmt::Display for Address<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render("\n"))
    }
}

impl fmt::Debug for Address<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Address<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for Address<'_> {}

impl Serialize for Address<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.components)
    }
}
