//! core/error.rs
//!
//! Error taxonomy for the façade.
//!
//! Acquisition failures are classified once, where the store is opened:
//! - the backend's "type unknown" status -> [`MediaError::NotAMediaFile`]
//! - anything else -> [`MediaError::Io`]
//!
//! A property that simply isn't set is NOT an error on the regular accessors
//! (`None` / `-1` / `Empty`). Only the strict read reports it.

use std::path::PathBuf;

use thiserror::Error;

use super::registry::{FieldType, MediaProperty};

#[derive(Debug, Error)]
pub enum MediaError {
    /// The path exists but carries no structured properties.
    #[error("The given file is not a media file: '{}'", path.display())]
    NotAMediaFile { path: PathBuf },

    /// Any other backend failure (open, read, write, commit).
    #[error("An IO error happened with the file: '{}', description: {description}", path.display())]
    Io { path: PathBuf, description: String },

    /// Ordinal outside the supported range.
    #[error("unsupported field ordinal: {0}")]
    UnknownOrdinal(i32),

    #[error("File doesn't exist: '{}'", path.display())]
    FileNotFound { path: PathBuf },

    /// Strict read of a property that isn't set.
    #[error("Property '{property}' doesn't exist on file: '{}'", path.display())]
    PropertyMissing {
        property: MediaProperty,
        path: PathBuf,
    },

    #[error("Can't set property '{property}' to a negative value! Tried to pass in value: '{value}'")]
    NegativeValue { property: MediaProperty, value: i64 },

    /// Stream fields (duration, sample rate, ...) can only be read.
    #[error("Property '{property}' is read-only")]
    ReadOnly { property: MediaProperty },

    #[error("Value '{value}' is too large for property '{property}'")]
    OutOfRange { property: MediaProperty, value: i64 },

    /// Text used where a number lives, or the other way round.
    #[error("Property '{property}' holds {holds:?} values")]
    TypeMismatch {
        property: MediaProperty,
        holds: FieldType,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MediaError {
    pub fn is_not_a_media_file(&self) -> bool {
        matches!(self, MediaError::NotAMediaFile { .. })
    }
}
