//! core/tags/mod.rs
//!
//! The on-disk property backend.
//! - text fields live in an ID3 tag (MP3 header, or the `id3 ` chunk of WAV/AIFF)
//! - stream fields (duration, sample rate, ...) come from a Symphonia probe and are read-only
//!
//! Changes are staged on the in-memory tag and hit the disk only on commit.

mod probe;
mod read;
mod util;
mod write;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use id3::{ErrorKind, Tag, Version};
use tracing::{debug, trace};

use self::probe::StreamInfo;
use crate::core::config::Config;
use crate::core::registry::{MediaProperty, PropertyKey, name_of};
use crate::core::store::{OpenMode, PropertyBackend, PropertyStore, Status};
use crate::core::types::PropertyValue;

/// Which tag layout a file uses, from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Mp3,
    Wav,
    Aiff,
    /// Decodable but without a tag we know how to write (FLAC, Ogg, MP4, ...).
    Other,
}

impl Container {
    fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("mp3") => Container::Mp3,
            Some("wav" | "wave") => Container::Wav,
            Some("aif" | "aiff" | "aifc") => Container::Aiff,
            _ => Container::Other,
        }
    }

    fn has_tag(self) -> bool {
        !matches!(self, Container::Other)
    }
}

/// Properties backed by real files.
#[derive(Debug, Clone)]
pub struct FileBackend {
    version: Version,
}

impl FileBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            version: config.tag_version.into(),
        }
    }
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl PropertyBackend for FileBackend {
    type Store = FileStore;

    fn open_store(&self, path: &Path, mode: OpenMode) -> Result<FileStore, Status> {
        let meta = fs::metadata(path).map_err(|e| Status::from_io(&e))?;
        if meta.is_dir() {
            return Err(Status::unknown_type());
        }

        let file = OpenOptions::new()
            .read(true)
            .write(mode == OpenMode::ReadWrite)
            .open(path)
            .map_err(|e| Status::from_io(&e))?;

        let stream = probe::probe(file, path, meta.len())?;

        let container = Container::from_path(path);
        let tag = if container.has_tag() {
            read::load_tag(path)?
        } else {
            Tag::new()
        };

        debug!(path = %path.display(), ?container, ?mode, "opened file store");

        Ok(FileStore {
            path: path.to_path_buf(),
            container,
            tag,
            stream,
            version: self.version,
            mode,
            dirty: false,
            released: false,
        })
    }
}

/// One open file: its tag (possibly with staged edits) and its probed stream info.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    container: Container,
    tag: Tag,
    stream: StreamInfo,
    version: Version,
    mode: OpenMode,
    dirty: bool,
    released: bool,
}

impl FileStore {
    fn value(&self, property: MediaProperty) -> PropertyValue {
        let from_stream = self.stream.value(property);
        if !from_stream.is_empty() {
            return from_stream;
        }
        read::tag_value(&self.tag, property)
    }

    /// Properties that currently hold a value, in ordinal order.
    fn present(&self) -> Vec<MediaProperty> {
        MediaProperty::ALL
            .into_iter()
            .filter(|p| !self.value(*p).is_empty())
            .collect()
    }
}

impl PropertyStore for FileStore {
    fn get_value(&self, key: &PropertyKey) -> Result<PropertyValue, Status> {
        Ok(name_of(key).map(|p| self.value(p)).unwrap_or_default())
    }

    fn set_value(&mut self, key: &PropertyKey, value: PropertyValue) -> Result<(), Status> {
        let property = name_of(key)
            .ok_or_else(|| Status::invalid_arg(format!("unsupported property key {key}")))?;

        if self.mode == OpenMode::Read {
            return Err(Status::access_denied("store was opened read-only"));
        }
        if !property.is_writable() {
            return Err(Status::access_denied(format!("{} is read-only", property.name())));
        }
        if !self.container.has_tag() {
            return Err(Status::access_denied(format!(
                "no writable tag for '{}'",
                self.path.display()
            )));
        }

        write::apply(&mut self.tag, property, &value, self.version)?;
        self.dirty = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Status> {
        if !self.dirty {
            trace!(path = %self.path.display(), "nothing to commit");
            return Ok(());
        }

        self.tag.write_to_path(&self.path, self.version).map_err(|e| match e.kind {
            ErrorKind::Io(io) => Status::from_io(&io),
            _ => Status::new(Status::ERROR_WRITE_FAULT, e.description),
        })?;

        debug!(path = %self.path.display(), version = ?self.version, "tag written");
        self.dirty = false;
        Ok(())
    }

    fn count(&self) -> Result<usize, Status> {
        Ok(self.present().len())
    }

    fn key_at(&self, index: usize) -> Result<PropertyKey, Status> {
        self.present()
            .get(index)
            .map(|p| p.key())
            .ok_or_else(|| Status::invalid_arg(format!("property index {index} out of range")))
    }

    fn release(&mut self) {
        debug_assert!(!self.released, "file store released twice");
        self.released = true;
        trace!(path = %self.path.display(), dirty = self.dirty, "file store released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_from_extension() {
        assert_eq!(Container::from_path(Path::new("a.MP3")), Container::Mp3);
        assert_eq!(Container::from_path(Path::new("a.wav")), Container::Wav);
        assert_eq!(Container::from_path(Path::new("a.aiff")), Container::Aiff);
        assert_eq!(Container::from_path(Path::new("a.flac")), Container::Other);
        assert_eq!(Container::from_path(Path::new("noext")), Container::Other);
    }

    #[test]
    fn backend_uses_configured_tag_version() {
        let config = Config::from_toml_str("tag_version = \"id3v23\"").expect("config");
        assert_eq!(FileBackend::new(&config).version, Version::Id3v23);
        assert_eq!(FileBackend::default().version, Version::Id3v24);
    }

    #[test]
    fn missing_file_is_an_io_status() {
        let status = FileBackend::default()
            .open_store(Path::new("/definitely/not/here.mp3"), OpenMode::Read)
            .unwrap_err();
        assert_eq!(status.code, Status::ERROR_FILE_NOT_FOUND);
    }
}
