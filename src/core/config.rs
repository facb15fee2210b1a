//! core/config.rs
//!
//! Process-wide settings, read once by `init_with`.
//!
//! Example file:
//! ```toml
//! # "multi_threaded" (default) or "apartment"
//! threading = "multi_threaded"
//!
//! # ID3 version used when tags are written back: "id3v23" or "id3v24" (default)
//! tag_version = "id3v24"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::MediaError;

/// How the ambient context is established.
///
/// - `MultiThreaded`: `init` once per process, then call from any thread.
/// - `Apartment`: every calling thread runs `init` itself before first use.
///
/// The crate's own backends need no per-thread state, so both are accepted; the
/// model is recorded so an embedding application can check it picked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadingModel {
    #[default]
    MultiThreaded,
    Apartment,
}

/// ID3 version written on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagVersion {
    Id3v23,
    #[default]
    Id3v24,
}

impl From<TagVersion> for id3::Version {
    fn from(v: TagVersion) -> Self {
        match v {
            TagVersion::Id3v23 => id3::Version::Id3v23,
            TagVersion::Id3v24 => id3::Version::Id3v24,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub threading: ThreadingModel,
    pub tag_version: TagVersion,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, MediaError> {
        toml::from_str(s).map_err(|e| MediaError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, MediaError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| MediaError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.threading, ThreadingModel::MultiThreaded);
        assert_eq!(config.tag_version, TagVersion::Id3v24);
    }

    #[test]
    fn parses_both_fields() {
        let config = Config::from_toml_str("threading = \"apartment\"\ntag_version = \"id3v23\"\n")
            .expect("parse");
        assert_eq!(config.threading, ThreadingModel::Apartment);
        assert_eq!(config.tag_version, TagVersion::Id3v23);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = Config::from_toml_str("tag_version = \"id3v1\"").unwrap_err();
        assert!(matches!(err, MediaError::Config(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mediaprops.toml");
        fs::write(&path, "tag_version = \"id3v23\"").expect("write");

        let config = Config::load(&path).expect("load");
        assert_eq!(config.tag_version, TagVersion::Id3v23);
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, MediaError::Config(_)));
    }
}
