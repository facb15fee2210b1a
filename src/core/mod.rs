//! core/mod.rs
//!
//! The façade:
//! - Check the path (exists, made absolute)
//! - Acquire a store handle for it (classifying failures)
//! - Get / set / clear / enumerate
//! - Commit after every write
//! - Release on every exit path (the handle's `Drop`)
//!
//! Every call is synchronous and stands alone: no state is shared between calls except
//! the read-only registry, so different threads can work on different files freely.
//! Two writers on the SAME file are not coordinated; the last commit wins.

pub mod config;
pub mod error;
pub mod memory;
pub mod registry;
pub mod store;
pub mod tags;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::debug;

use error::MediaError;
use registry::{FieldType, MediaProperty};
use store::{PropertyBackend, acquire};
use types::{FieldValue, PropertyMap, PropertyValue};

/// Property store façade over one backend.
#[derive(Debug, Clone, Default)]
pub struct MediaProps<B> {
    backend: B,
}

impl<B: PropertyBackend> MediaProps<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Absolute form of `path`, or `FileNotFound`.
    fn checked_path(&self, path: &Path) -> Result<PathBuf, MediaError> {
        let abs = std::path::absolute(path).map_err(|e| MediaError::Io {
            path: path.to_path_buf(),
            description: e.to_string(),
        })?;

        if !self.backend.exists(&abs) {
            return Err(MediaError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(abs)
    }

    fn read_value(&self, path: &Path, property: MediaProperty) -> Result<PropertyValue, MediaError> {
        let path = self.checked_path(path)?;
        let handle = acquire(&self.backend, &path)?;
        handle.get(property)
    }

    /// One handle, every value staged, one commit. Read-only fields are refused up front.
    fn write_values(
        &self,
        path: &Path,
        values: Vec<(MediaProperty, PropertyValue)>,
    ) -> Result<(), MediaError> {
        if let Some((property, _)) = values.iter().find(|(p, _)| !p.is_writable()) {
            return Err(MediaError::ReadOnly {
                property: *property,
            });
        }

        let path = self.checked_path(path)?;
        let mut handle = acquire(&self.backend, &path)?;

        let mut staged = Ok(());
        for (property, value) in values {
            debug!(path = %path.display(), property = property.name(), "writing property");
            staged = handle.set(property, value);
            if staged.is_err() {
                break;
            }
        }

        // Commit even when staging failed part-way: whatever was staged is persisted.
        let committed = handle.commit();
        staged?;
        committed
    }

    /// `false` exactly when acquisition reports "not a media file".
    ///
    /// Every other outcome, including an IO failure (missing or locked file), is
    /// reported as `true`.
    pub fn is_valid_media_file(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        match acquire(&self.backend, &abs) {
            Ok(_handle) => true,
            Err(e) => !e.is_not_a_media_file(),
        }
    }

    pub fn has_property(&self, path: impl AsRef<Path>, property: MediaProperty) -> Result<bool, MediaError> {
        Ok(!self.read_value(path.as_ref(), property)?.is_empty())
    }

    /// `Ok(None)` when the property isn't set. A multi-valued property yields its first value.
    pub fn read_string(
        &self,
        path: impl AsRef<Path>,
        property: MediaProperty,
    ) -> Result<Option<String>, MediaError> {
        let value = self.read_value(path.as_ref(), property)?;
        if value.is_numeric() {
            return Err(MediaError::TypeMismatch {
                property,
                holds: FieldType::UnsignedInt,
            });
        }
        Ok(value.as_text().map(str::to_owned))
    }

    /// `-1` when the property isn't set. Stored numeric properties are unsigned, so `-1`
    /// never collides with a real value.
    pub fn read_int(&self, path: impl AsRef<Path>, property: MediaProperty) -> Result<i64, MediaError> {
        let value = self.read_value(path.as_ref(), property)?;
        if value.is_empty() {
            return Ok(-1);
        }
        value.as_integer().ok_or(MediaError::TypeMismatch {
            property,
            holds: FieldType::Text,
        })
    }

    /// Strict read: a missing property is an error.
    pub fn read_property(
        &self,
        path: impl AsRef<Path>,
        property: MediaProperty,
    ) -> Result<FieldValue, MediaError> {
        let path = path.as_ref();
        self.read_optional_property(path, property)?
            .ok_or_else(|| MediaError::PropertyMissing {
                property,
                path: path.to_path_buf(),
            })
    }

    pub fn read_optional_property(
        &self,
        path: impl AsRef<Path>,
        property: MediaProperty,
    ) -> Result<Option<FieldValue>, MediaError> {
        Ok(self.read_value(path.as_ref(), property)?.normalize())
    }

    /// `default` when the property isn't set.
    pub fn read_or_default_property(
        &self,
        path: impl AsRef<Path>,
        property: MediaProperty,
        default: FieldValue,
    ) -> Result<FieldValue, MediaError> {
        Ok(self
            .read_optional_property(path, property)?
            .unwrap_or(default))
    }

    pub fn read_all_properties(&self, path: impl AsRef<Path>) -> Result<PropertyMap, MediaError> {
        let path = self.checked_path(path.as_ref())?;
        let handle = acquire(&self.backend, &path)?;
        handle.enumerate()
    }

    pub fn write_string(
        &self,
        path: impl AsRef<Path>,
        property: MediaProperty,
        value: &str,
    ) -> Result<(), MediaError> {
        let value = store_value(property, FieldValue::from(value))?;
        self.write_values(path.as_ref(), vec![(property, value)])
    }

    /// Numeric fields are unsigned: negatives are rejected before the file is touched.
    pub fn write_int(
        &self,
        path: impl AsRef<Path>,
        property: MediaProperty,
        value: i64,
    ) -> Result<(), MediaError> {
        let value = store_value(property, FieldValue::Number(value))?;
        self.write_values(path.as_ref(), vec![(property, value)])
    }

    /// `None` clears the property.
    pub fn write_property(
        &self,
        path: impl AsRef<Path>,
        property: MediaProperty,
        value: Option<FieldValue>,
    ) -> Result<(), MediaError> {
        let value = match value {
            Some(v) => store_value(property, v)?,
            None => PropertyValue::Empty,
        };
        self.write_values(path.as_ref(), vec![(property, value)])
    }

    /// Every entry is validated first; then one handle, one commit.
    pub fn write_all_properties(
        &self,
        path: impl AsRef<Path>,
        properties: &PropertyMap,
    ) -> Result<(), MediaError> {
        let values = properties
            .iter()
            .map(|(p, v)| store_value(*p, v.clone()).map(|v| (*p, v)))
            .collect::<Result<Vec<_>, _>>()?;
        self.write_values(path.as_ref(), values)
    }

    pub fn clear_property(&self, path: impl AsRef<Path>, property: MediaProperty) -> Result<(), MediaError> {
        self.write_values(path.as_ref(), vec![(property, PropertyValue::Empty)])
    }

    pub fn clear_properties(
        &self,
        path: impl AsRef<Path>,
        properties: &[MediaProperty],
    ) -> Result<(), MediaError> {
        let values = properties.iter().map(|p| (*p, PropertyValue::Empty)).collect();
        self.write_values(path.as_ref(), values)
    }

    /// Clears every writable property; stream fields stay as they are.
    pub fn clear_all_properties(&self, path: impl AsRef<Path>) -> Result<(), MediaError> {
        let writable: Vec<_> = MediaProperty::ALL
            .into_iter()
            .filter(|p| p.is_writable())
            .collect();
        self.clear_properties(path, &writable)
    }

    /// Copy one property from `from` to `to`. Absent on `from` means cleared on `to`.
    pub fn copy_property(
        &self,
        from: impl AsRef<Path>,
        to: impl AsRef<Path>,
        property: MediaProperty,
    ) -> Result<(), MediaError> {
        let value = self.read_optional_property(from, property)?;
        self.write_property(to, property, value)
    }
}

/// Check a caller value against the field's type and turn it into a store value.
fn store_value(property: MediaProperty, value: FieldValue) -> Result<PropertyValue, MediaError> {
    match (property.field_type(), value) {
        (FieldType::Text, FieldValue::Text(s)) => Ok(PropertyValue::Text(s)),
        (FieldType::UnsignedInt, FieldValue::Number(n)) => {
            if n < 0 {
                return Err(MediaError::NegativeValue { property, value: n });
            }
            u32::try_from(n)
                .map(PropertyValue::UInt32)
                .map_err(|_| MediaError::OutOfRange { property, value: n })
        }
        (holds, _) => Err(MediaError::TypeMismatch { property, holds }),
    }
}
