//! Value types shared by the registry, the backends and the façade.
//!
//! Rule of thumb:
//! - These are "boring bags of data"
//! - No filesystem code
//! - No tag parsing code
//!
//! `PropertyValue` is what a backend stores (tagged, width-specific).
//! `FieldValue` is what callers get back after normalization:
//! - every integer width -> one `i64`
//! - a text sequence -> its first element

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

use super::registry::MediaProperty;

/// Raw value as the store holds it. `Empty` = property not present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyValue {
    #[default]
    Empty,
    Int32(i32),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Text(String),
    TextSequence(Vec<String>),
}

impl PropertyValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, PropertyValue::Empty)
    }

    /// Text view. For a sequence only the first element is surfaced.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::TextSequence(v) => v.first().map(String::as_str),
            _ => None,
        }
    }

    /// Integer view with every width widened to `i64`.
    /// `None` for text, empty, or a `u64` past `i64::MAX`.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            PropertyValue::Int32(v) => Some(i64::from(v)),
            PropertyValue::UInt16(v) => Some(i64::from(v)),
            PropertyValue::UInt32(v) => Some(i64::from(v)),
            PropertyValue::UInt64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PropertyValue::Int32(_)
                | PropertyValue::UInt16(_)
                | PropertyValue::UInt32(_)
                | PropertyValue::UInt64(_)
        )
    }

    /// Collapse to the caller-facing representation. `None` for `Empty`
    /// (and for an empty sequence or an unrepresentable `u64`).
    pub fn normalize(&self) -> Option<FieldValue> {
        if self.is_numeric() {
            return self.as_integer().map(FieldValue::Number);
        }
        self.as_text().map(|s| FieldValue::Text(s.to_owned()))
    }
}

/// Normalized value handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n)
    }
}

/// Field -> value, ordered by ordinal. Serializes as `{ "TITLE": "...", "YEAR": 2024 }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: BTreeMap<MediaProperty, FieldValue>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous value, if any.
    pub fn insert(&mut self, property: MediaProperty, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.entries.insert(property, value.into())
    }

    pub fn get(&self, property: MediaProperty) -> Option<&FieldValue> {
        self.entries.get(&property)
    }

    pub fn text(&self, property: MediaProperty) -> Option<&str> {
        self.get(property).and_then(FieldValue::as_text)
    }

    pub fn number(&self, property: MediaProperty) -> Option<i64> {
        self.get(property).and_then(FieldValue::as_number)
    }

    pub fn contains(&self, property: MediaProperty) -> bool {
        self.entries.contains_key(&property)
    }

    pub fn remove(&mut self, property: MediaProperty) -> Option<FieldValue> {
        self.entries.remove(&property)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, MediaProperty, FieldValue> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a MediaProperty, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, MediaProperty, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(MediaProperty, FieldValue)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (MediaProperty, FieldValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
