//! mediaprops
//!
//! # What this crate is
//! A small façade for reading and writing per-file media metadata
//! (title, author, comment, year, duration, bitrate, ...).
//!
//! Every operation follows the same short sequence:
//! **resolve ordinal -> open the file's property store -> get/set -> commit -> release**
//!
//! - The store itself lives behind the [`PropertyBackend`] trait.
//! - [`FileBackend`] is the default: ID3 tags for text fields, a Symphonia probe for
//!   stream fields (duration, sample rate, ...).
//! - [`MemoryBackend`] keeps everything in process (tests, fakes).
//!
//! # Quick start
//! ```no_run
//! mediaprops::init();
//!
//! let title = mediaprops::MediaProperty::Title.ordinal();
//! mediaprops::write_string("song.mp3", title, "Sample")?;
//! assert_eq!(mediaprops::read_string("song.mp3", title)?.as_deref(), Some("Sample"));
//! # Ok::<(), mediaprops::MediaError>(())
//! ```
//!
//! The functions at the crate root take the integer ordinal (the public contract) and
//! use a [`FileBackend`] configured by [`init_with`]. Use [`MediaProps`] directly to
//! pick another backend or to work with typed [`MediaProperty`] values.

pub mod core;

use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

pub use crate::core::MediaProps;
pub use crate::core::config::{Config, TagVersion, ThreadingModel};
pub use crate::core::error::MediaError;
pub use crate::core::memory::MemoryBackend;
pub use crate::core::registry::{
    FieldType, MediaProperty, PropertyKey, PropertyNamespace, name_of, resolve,
};
pub use crate::core::store::{OpenMode, PropertyBackend, PropertyStore, Status, StoreHandle};
pub use crate::core::tags::FileBackend;
pub use crate::core::types::{FieldValue, PropertyMap, PropertyValue};

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Process-wide initialization with the default [`Config`].
///
/// Call once at startup. Calling it again (from any thread) is a no-op.
pub fn init() {
    init_with(Config::default());
}

/// Process-wide initialization with an explicit [`Config`].
///
/// Only the first call wins; the returned reference is the configuration actually in
/// effect. There is no teardown: the context lives until the process exits.
pub fn init_with(config: Config) -> &'static Config {
    let mut first = false;
    let active = CONFIG.get_or_init(|| {
        first = true;
        config
    });

    if first {
        crate::core::registry::warm_up();
        debug!(
            threading = ?active.threading,
            tag_version = ?active.tag_version,
            "mediaprops initialized"
        );
    }

    active
}

/// Whether [`init`] / [`init_with`] already ran in this process.
pub fn is_initialized() -> bool {
    CONFIG.get().is_some()
}

fn facade() -> MediaProps<FileBackend> {
    let config = match CONFIG.get() {
        Some(c) => c,
        None => init_with(Config::default()),
    };
    MediaProps::new(FileBackend::new(config))
}

/// `false` exactly when the backend classifies `path` as "not a media file".
///
/// Any other acquisition outcome (success, or an IO failure such as a locked file)
/// counts as `true`.
pub fn is_valid_media_file(path: impl AsRef<Path>) -> bool {
    facade().is_valid_media_file(path)
}

/// Whether the property behind `ordinal` currently holds a value.
pub fn has_property(path: impl AsRef<Path>, ordinal: i32) -> Result<bool, MediaError> {
    facade().has_property(path, MediaProperty::from_ordinal(ordinal)?)
}

/// Read a text property. `Ok(None)` means the property is not set.
pub fn read_string(path: impl AsRef<Path>, ordinal: i32) -> Result<Option<String>, MediaError> {
    facade().read_string(path, MediaProperty::from_ordinal(ordinal)?)
}

/// Read a numeric property. Returns `-1` when the property is not set.
pub fn read_int(path: impl AsRef<Path>, ordinal: i32) -> Result<i64, MediaError> {
    facade().read_int(path, MediaProperty::from_ordinal(ordinal)?)
}

/// Write a text property and commit it.
pub fn write_string(path: impl AsRef<Path>, ordinal: i32, value: &str) -> Result<(), MediaError> {
    facade().write_string(path, MediaProperty::from_ordinal(ordinal)?, value)
}

/// Write a numeric property and commit it. Negative values are rejected.
pub fn write_int(path: impl AsRef<Path>, ordinal: i32, value: i64) -> Result<(), MediaError> {
    facade().write_int(path, MediaProperty::from_ordinal(ordinal)?, value)
}

/// Remove a property's value (the store itself stays).
pub fn clear_property(path: impl AsRef<Path>, ordinal: i32) -> Result<(), MediaError> {
    facade().clear_property(path, MediaProperty::from_ordinal(ordinal)?)
}

/// Every known property currently present on the file.
pub fn read_all_properties(path: impl AsRef<Path>) -> Result<PropertyMap, MediaError> {
    facade().read_all_properties(path)
}
