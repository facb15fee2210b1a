//! core/memory.rs
//!
//! In-process backend: every "file" is a list of (key, value) pairs behind a mutex.
//!
//! Useful for:
//! - tests of the façade (no media files needed)
//! - embedding applications that want a fake store
//!
//! Knobs for failure paths: non-media paths, locked paths, failing commits.
//! Counters (`stats`) let tests check that every open store was released.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::registry::PropertyKey;
use super::store::{OpenMode, PropertyBackend, PropertyStore, Status};
use super::types::PropertyValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub opened: usize,
    pub released: usize,
    pub commits: usize,
}

#[derive(Debug, Default)]
struct MemoryFile {
    media: bool,
    locked: bool,
    fail_commit: bool,
    values: Vec<(PropertyKey, PropertyValue)>,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<PathBuf, MemoryFile>,
    stats: MemoryStats,
}

/// Cloning shares the same underlying files.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

fn key_for(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not wedge every other user of the backend.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_file(&self, path: &Path, f: impl FnOnce(&mut MemoryFile)) {
        let mut state = self.state();
        f(state.files.entry(key_for(path)).or_default());
    }

    /// Register an (empty) property-bearing file.
    pub fn add_media_file(&self, path: impl AsRef<Path>) {
        self.with_file(path.as_ref(), |file| file.media = true);
    }

    /// Register a file that exists but has no property store.
    pub fn add_non_media_file(&self, path: impl AsRef<Path>) {
        self.with_file(path.as_ref(), |file| file.media = false);
    }

    /// Opens fail with a sharing violation until [`MemoryBackend::unlock`].
    pub fn lock(&self, path: impl AsRef<Path>) {
        self.with_file(path.as_ref(), |file| file.locked = true);
    }

    pub fn unlock(&self, path: impl AsRef<Path>) {
        self.with_file(path.as_ref(), |file| file.locked = false);
    }

    /// Make every commit on `path` fail (or succeed again).
    pub fn fail_commits(&self, path: impl AsRef<Path>, fail: bool) {
        self.with_file(path.as_ref(), |file| file.fail_commit = fail);
    }

    /// Put a value straight into the committed state, bypassing the façade.
    pub fn seed(&self, path: impl AsRef<Path>, key: PropertyKey, value: PropertyValue) {
        self.with_file(path.as_ref(), |file| upsert(&mut file.values, key, value));
    }

    /// Committed value, as a later open would see it.
    pub fn committed(&self, path: impl AsRef<Path>, key: &PropertyKey) -> PropertyValue {
        self.state()
            .files
            .get(&key_for(path.as_ref()))
            .and_then(|file| lookup(&file.values, key))
            .unwrap_or_default()
    }

    pub fn stats(&self) -> MemoryStats {
        self.state().stats
    }

    /// Whether `path` was registered at all (media or not).
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.state().files.contains_key(&key_for(path.as_ref()))
    }
}

fn lookup(values: &[(PropertyKey, PropertyValue)], key: &PropertyKey) -> Option<PropertyValue> {
    values.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

fn upsert(values: &mut Vec<(PropertyKey, PropertyValue)>, key: PropertyKey, value: PropertyValue) {
    let pos = values.iter().position(|(k, _)| *k == key);
    match (pos, value) {
        (Some(i), PropertyValue::Empty) => {
            values.remove(i);
        }
        (None, PropertyValue::Empty) => {}
        (Some(i), value) => values[i].1 = value,
        (None, value) => values.push((key, value)),
    }
}

impl PropertyBackend for MemoryBackend {
    type Store = MemoryStore;

    fn open_store(&self, path: &Path, _mode: OpenMode) -> Result<MemoryStore, Status> {
        let key = key_for(path);
        let mut state = self.state();

        let file = state.files.get(&key).ok_or_else(Status::file_not_found)?;
        if !file.media {
            return Err(Status::unknown_type());
        }
        if file.locked {
            return Err(Status::sharing_violation());
        }

        let values = file.values.clone();
        state.stats.opened += 1;

        Ok(MemoryStore {
            state: Arc::clone(&self.state),
            path: key,
            values,
            released: false,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.contains(path)
    }
}

/// Working copy of one memory file; `commit` publishes it.
#[derive(Debug)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    path: PathBuf,
    values: Vec<(PropertyKey, PropertyValue)>,
    released: bool,
}

impl MemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PropertyStore for MemoryStore {
    fn get_value(&self, key: &PropertyKey) -> Result<PropertyValue, Status> {
        Ok(lookup(&self.values, key).unwrap_or_default())
    }

    fn set_value(&mut self, key: &PropertyKey, value: PropertyValue) -> Result<(), Status> {
        upsert(&mut self.values, *key, value);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Status> {
        let values = self.values.clone();
        let mut state = self.state();

        let file = state
            .files
            .get_mut(&self.path)
            .ok_or_else(Status::file_not_found)?;
        if file.fail_commit {
            return Err(Status::new(
                Status::ERROR_WRITE_FAULT,
                "The system cannot write to the specified device.",
            ));
        }

        file.values = values;
        state.stats.commits += 1;
        Ok(())
    }

    fn count(&self) -> Result<usize, Status> {
        Ok(self.values.len())
    }

    fn key_at(&self, index: usize) -> Result<PropertyKey, Status> {
        self.values
            .get(index)
            .map(|(k, _)| *k)
            .ok_or_else(|| Status::invalid_arg(format!("no property at index {index}")))
    }

    fn release(&mut self) {
        debug_assert!(!self.released, "memory store released twice");
        self.released = true;
        self.state().stats.released += 1;
    }
}
