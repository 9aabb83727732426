//! # Subdivision Metadata
//!
//! Every subdivision in an address's containment chain contributes four
//! components keyed by an identifier derived from its human-readable type:
//!
//! | Key               | Value                      |
//! |-------------------|----------------------------|
//! | `<type>`          | the subdivision entity     |
//! | `<type>_code`     | ISO 3166-2 code            |
//! | `<type>_name`     | display name               |
//! | `<type>_type_name`| the type as written in ISO |
//!
//! ## Type identifiers
//!
//! The type name is transliterated to ASCII, lower-cased, and every run of
//! non-alphanumeric characters becomes a single `_`. Any type with a `city`
//! or `municipality` token is classified as `city`.
//!
//! Derived keys must not shadow base components other than `city_name`. A
//! type whose keys would (a subdivision of type "Country" produces
//! `country_code`) is qualified as `<type>_subdivision`.

use std::collections::BTreeMap;

use deunicode::deunicode;
use postal_core::Subdivision;

use crate::component::{ComponentId, ComponentValue};

const CITY_TOKENS: [&str; 2] = ["city", "municipality"];

/// Identifier used when a type name has no alphanumeric content.
const FALLBACK_TYPE_ID: &str = "subdivision_type";

/// Lower-case ASCII slug with `_` separators.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in deunicode(text).chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Identifier of a subdivision type, as used in metadata keys.
pub fn type_id(type_name: &str) -> String {
    let slug = slugify(type_name);
    if slug.is_empty() {
        return FALLBACK_TYPE_ID.to_string();
    }
    if slug.split('_').any(|token| CITY_TOKENS.contains(&token)) {
        return "city".to_string();
    }
    if metadata_keys(&slug).iter().any(|key| shadows_base(key)) {
        return format!("{slug}_subdivision");
    }
    slug
}

/// Identifier of a subdivision's type.
pub fn subdivision_type_id(subdivision: &Subdivision) -> String {
    type_id(&subdivision.type_name)
}

/// The four metadata components a subdivision contributes.
pub fn subdivision_metadata(subdivision: &Subdivision) -> BTreeMap<String, ComponentValue> {
    let [entity, code, name, type_name] = metadata_keys(&subdivision_type_id(subdivision));
    BTreeMap::from([
        (entity, ComponentValue::Subdivision(subdivision.clone())),
        (code, ComponentValue::Text(subdivision.code.clone())),
        (name, ComponentValue::Text(subdivision.name.clone())),
        (type_name, ComponentValue::Text(subdivision.type_name.clone())),
    ])
}

fn metadata_keys(type_id: &str) -> [String; 4] {
    [
        type_id.to_string(),
        format!("{type_id}_code"),
        format!("{type_id}_name"),
        format!("{type_id}_type_name"),
    ]
}

fn shadows_base(key: &str) -> bool {
    match key.parse::<ComponentId>() {
        Ok(id) => !ComponentId::metadata_whitelist().contains(&id),
        Err(_) => false,
    }
}
