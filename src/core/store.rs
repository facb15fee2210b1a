//! core/store.rs
//!
//! The seam between the façade and whatever actually stores properties.
//!
//! - [`PropertyBackend`] opens a store for a path (or reports a [`Status`])
//! - [`PropertyStore`] is one open store: get / set / commit / count / key_at / release
//! - [`StoreHandle`] owns a store for the length of ONE façade call and releases it
//!   exactly once, in `Drop`, whatever happened in between
//!
//! Lifecycle of a call:
//! **Idle -> Acquiring -> Active -> Closed**, or **Acquiring -> Failed** (nothing to release).

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use super::error::MediaError;
use super::registry::{MediaProperty, PropertyKey, name_of};
use super::types::{PropertyMap, PropertyValue};

/// HRESULT-style backend status: a code plus the human-readable text for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: i32,
    pub description: String,
}

impl Status {
    /// "Unspecified error". Stores report it when they can't make sense of a file type.
    pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;
    pub const E_ACCESSDENIED: i32 = 0x8007_0005_u32 as i32;
    pub const E_INVALIDARG: i32 = 0x8007_0057_u32 as i32;
    pub const ERROR_FILE_NOT_FOUND: i32 = 0x8007_0002_u32 as i32;
    pub const ERROR_INVALID_DATA: i32 = 0x8007_000D_u32 as i32;
    pub const ERROR_SHARING_VIOLATION: i32 = 0x8007_0020_u32 as i32;
    pub const ERROR_WRITE_FAULT: i32 = 0x8007_001D_u32 as i32;
    pub const STG_E_ACCESSDENIED: i32 = 0x8003_0005_u32 as i32;

    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// The "type unknown" status: the path is not a property-bearing file.
    pub fn unknown_type() -> Self {
        Self::new(Self::E_FAIL, "Unspecified error")
    }

    pub fn access_denied(description: impl Into<String>) -> Self {
        Self::new(Self::STG_E_ACCESSDENIED, description)
    }

    pub fn invalid_arg(description: impl Into<String>) -> Self {
        Self::new(Self::E_INVALIDARG, description)
    }

    pub fn invalid_data(description: impl Into<String>) -> Self {
        Self::new(Self::ERROR_INVALID_DATA, description)
    }

    pub fn sharing_violation() -> Self {
        Self::new(
            Self::ERROR_SHARING_VIOLATION,
            "The process cannot access the file because it is being used by another process.",
        )
    }

    pub fn file_not_found() -> Self {
        Self::new(Self::ERROR_FILE_NOT_FOUND, "The system cannot find the file specified.")
    }

    /// Map an OS error onto the closest status code, keeping the OS text.
    pub fn from_io(err: &io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::NotFound => Self::ERROR_FILE_NOT_FOUND,
            io::ErrorKind::PermissionDenied => Self::E_ACCESSDENIED,
            io::ErrorKind::InvalidInput => Self::E_INVALIDARG,
            _ => Self::ERROR_WRITE_FAULT,
        };
        Self::new(code, err.to_string())
    }

    pub fn is_unknown_type(&self) -> bool {
        self.code == Self::E_FAIL
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.description, self.code as u32)
    }
}

impl std::error::Error for Status {}

/// Access requested when opening a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    ReadWrite,
}

/// One open property collection for one file.
pub trait PropertyStore {
    /// `Ok(PropertyValue::Empty)` when the property isn't set.
    fn get_value(&self, key: &PropertyKey) -> Result<PropertyValue, Status>;

    /// Stage a change; nothing is persisted before [`PropertyStore::commit`].
    fn set_value(&mut self, key: &PropertyKey, value: PropertyValue) -> Result<(), Status>;

    fn commit(&mut self) -> Result<(), Status>;

    /// Number of properties currently present.
    fn count(&self) -> Result<usize, Status>;

    fn key_at(&self, index: usize) -> Result<PropertyKey, Status>;

    /// Give the store back. Called exactly once, by [`StoreHandle`]'s `Drop`.
    fn release(&mut self);
}

/// Opens stores. Implementations must be safe to call from several threads at once
/// when they are `Sync`.
pub trait PropertyBackend {
    type Store: PropertyStore;

    fn open_store(&self, path: &Path, mode: OpenMode) -> Result<Self::Store, Status>;

    /// Pre-check used before every operation except the media-file probe.
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Scoped ownership of an open store. Never escapes the façade call that made it.
pub struct StoreHandle<S: PropertyStore> {
    store: S,
    path: PathBuf,
}

impl<S: PropertyStore> fmt::Debug for StoreHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle").field("path", &self.path).finish_non_exhaustive()
    }
}

/// Open `path` read-write and classify any failure.
pub fn acquire<B: PropertyBackend>(
    backend: &B,
    path: &Path,
) -> Result<StoreHandle<B::Store>, MediaError> {
    debug!(path = %path.display(), "acquiring property store");

    match backend.open_store(path, OpenMode::ReadWrite) {
        Ok(store) => Ok(StoreHandle {
            store,
            path: path.to_path_buf(),
        }),
        Err(status) if status.is_unknown_type() => {
            debug!(path = %path.display(), "not a media file");
            Err(MediaError::NotAMediaFile {
                path: path.to_path_buf(),
            })
        }
        Err(status) => {
            warn!(path = %path.display(), %status, "property store open failed");
            Err(io_failure(path, &status))
        }
    }
}

fn io_failure(path: &Path, status: &Status) -> MediaError {
    MediaError::Io {
        path: path.to_path_buf(),
        description: status.description.clone(),
    }
}

impl<S: PropertyStore> StoreHandle<S> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only; never commits.
    pub fn get(&self, property: MediaProperty) -> Result<PropertyValue, MediaError> {
        self.store
            .get_value(&property.key())
            .map_err(|status| io_failure(&self.path, &status))
    }

    /// Stage a value. Callers commit afterwards.
    pub fn set(&mut self, property: MediaProperty, value: PropertyValue) -> Result<(), MediaError> {
        trace!(path = %self.path.display(), property = property.name(), ?value, "set");
        self.store
            .set_value(&property.key(), value)
            .map_err(|status| io_failure(&self.path, &status))
    }

    pub fn clear(&mut self, property: MediaProperty) -> Result<(), MediaError> {
        self.set(property, PropertyValue::Empty)
    }

    pub fn commit(&mut self) -> Result<(), MediaError> {
        self.store.commit().map_err(|status| {
            warn!(path = %self.path.display(), %status, "commit failed");
            io_failure(&self.path, &status)
        })
    }

    /// Walk every property the store reports. Keys the registry doesn't know are skipped,
    /// and so are values that have no caller-facing form.
    pub fn enumerate(&self) -> Result<PropertyMap, MediaError> {
        let count = self
            .store
            .count()
            .map_err(|status| io_failure(&self.path, &status))?;

        let mut out = PropertyMap::new();
        for index in 0..count {
            let key = self
                .store
                .key_at(index)
                .map_err(|status| io_failure(&self.path, &status))?;

            let Some(property) = name_of(&key) else {
                trace!(%key, "skipping unknown property key");
                continue;
            };

            let value = self.get(property)?;
            match value.normalize() {
                Some(v) => {
                    out.insert(property, v);
                }
                None => {
                    trace!(property = property.name(), ?value, "skipping value without a normalized form");
                }
            }
        }

        Ok(out)
    }
}

impl<S: PropertyStore> Drop for StoreHandle<S> {
    fn drop(&mut self) {
        trace!(path = %self.path.display(), "releasing property store");
        self.store.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MemoryBackend;

    #[test]
    fn unknown_type_is_classified_as_not_a_media_file() {
        let backend = MemoryBackend::new();
        backend.add_non_media_file("/music/readme.txt");

        let err = acquire(&backend, Path::new("/music/readme.txt")).unwrap_err();
        assert!(err.is_not_a_media_file());
        assert_eq!(
            err.to_string(),
            "The given file is not a media file: '/music/readme.txt'"
        );
        assert_eq!(backend.stats().opened, 0);
    }

    #[test]
    fn other_statuses_become_io_failures_with_description() {
        let backend = MemoryBackend::new();
        backend.add_media_file("/music/a.mp3");
        backend.lock("/music/a.mp3");

        let err = acquire(&backend, Path::new("/music/a.mp3")).unwrap_err();
        match err {
            MediaError::Io { path, description } => {
                assert_eq!(path, Path::new("/music/a.mp3"));
                assert!(description.contains("being used by another process"));
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn handle_releases_exactly_once_on_drop() {
        let backend = MemoryBackend::new();
        backend.add_media_file("/music/a.mp3");

        {
            let handle = acquire(&backend, Path::new("/music/a.mp3")).expect("acquire");
            assert!(handle.get(MediaProperty::Title).expect("get").is_empty());
            assert_eq!(backend.stats().released, 0);
        }

        let stats = backend.stats();
        assert_eq!(stats.opened, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.commits, 0);
    }

    #[test]
    fn enumerate_normalizes_and_skips_unknown_keys() {
        let backend = MemoryBackend::new();
        backend.add_media_file("/music/a.mp3");
        backend.seed("/music/a.mp3", MediaProperty::Title.key(), PropertyValue::Text("Sample".into()));
        backend.seed(
            "/music/a.mp3",
            MediaProperty::Duration.key(),
            PropertyValue::UInt64(40_040_000),
        );
        backend.seed(
            "/music/a.mp3",
            MediaProperty::Keywords.key(),
            PropertyValue::TextSequence(vec!["rock".into(), "live".into()]),
        );
        let stray = PropertyKey::new(MediaProperty::Title.key().namespace, 77);
        backend.seed("/music/a.mp3", stray, PropertyValue::Text("ignored".into()));

        let handle = acquire(&backend, Path::new("/music/a.mp3")).expect("acquire");
        let map = handle.enumerate().expect("enumerate");

        assert_eq!(map.len(), 3);
        assert_eq!(map.text(MediaProperty::Title), Some("Sample"));
        assert_eq!(map.number(MediaProperty::Duration), Some(40_040_000));
        assert_eq!(map.text(MediaProperty::Keywords), Some("rock"));
    }

    #[test]
    fn status_display_includes_hex_code() {
        let status = Status::unknown_type();
        assert_eq!(status.to_string(), "Unspecified error (0x80004005)");
        assert_eq!(Status::E_FAIL, -2147467259);
    }
}
