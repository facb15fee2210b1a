//! core/registry.rs
//!
//! The property key registry:
//! - `MediaProperty` = the closed set of fields this crate knows (ordinal = public contract)
//! - `PropertyKey` = the backend's opaque key for a field (format GUID + property id)
//! - `resolve(ordinal)` goes forward, `name_of(key)` goes back
//!
//! The forward table is a `const` array. The reverse table is keyed by the key's
//! canonical text form (`"{GUID} pid"`), built once on first use.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Serialize, Serializer};

use super::error::MediaError;

/// A Windows-style GUID, kept as its four classic fields so the canonical text form
/// comes out exactly as the shell prints it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyNamespace {
    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8],
}

impl PropertyNamespace {
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }
}

impl fmt::Display for PropertyNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

// Shell property sets.
const SUMMARY_INFO: PropertyNamespace = PropertyNamespace::new(
    0xF29F85E0,
    0x4FF9,
    0x1068,
    [0xAB, 0x91, 0x08, 0x00, 0x2B, 0x27, 0xB3, 0xD9],
);
const DOC_SUMMARY_INFO: PropertyNamespace = PropertyNamespace::new(
    0xD5CDD502,
    0x2E9C,
    0x101B,
    [0x93, 0x97, 0x08, 0x00, 0x2B, 0x2C, 0xF9, 0xAE],
);
const MEDIA_FILE_SUMMARY: PropertyNamespace = PropertyNamespace::new(
    0x64440492,
    0x4C8B,
    0x11D1,
    [0x8B, 0x70, 0x08, 0x00, 0x36, 0xB1, 0x1A, 0x03],
);
const AUDIO_SUMMARY: PropertyNamespace = PropertyNamespace::new(
    0x64440490,
    0x4C8B,
    0x11D1,
    [0x8B, 0x70, 0x08, 0x00, 0x36, 0xB1, 0x1A, 0x03],
);
const MEDIA_EXTENDED: PropertyNamespace = PropertyNamespace::new(
    0x56A3372E,
    0xCE9C,
    0x11D2,
    [0x9F, 0x0E, 0x00, 0x60, 0x97, 0xC6, 0x86, 0xF6],
);

/// Opaque backend key: namespace GUID + integer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub namespace: PropertyNamespace,
    pub pid: u32,
}

impl PropertyKey {
    pub const fn new(namespace: PropertyNamespace, pid: u32) -> Self {
        Self { namespace, pid }
    }

    /// `"{F29F85E0-4FF9-1068-AB91-08002B27B3D9} 2"`
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.namespace, self.pid)
    }
}

/// How a field's value is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    UnsignedInt,
}

/// One metadata field. The discriminant is the public ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaProperty {
    Author = 0,
    Comment = 1,
    Copyright = 2,
    Keywords = 3,
    Language = 4,
    SubTitle = 5,
    Year = 6,
    Title = 7,
    Director = 8,
    AudioChannelCount = 9,
    AudioEncodingBitrate = 10,
    AuthorUrl = 11,
    EncodedBy = 12,
    Duration = 13,
    AudioFormat = 14,
    AudioSampleRate = 15,
    AudioSampleSize = 16,
}

struct Entry {
    key: PropertyKey,
    name: &'static str,
    display: &'static str,
    field_type: FieldType,
    writable: bool,
}

const fn entry(
    namespace: PropertyNamespace,
    pid: u32,
    name: &'static str,
    display: &'static str,
    field_type: FieldType,
    writable: bool,
) -> Entry {
    Entry {
        key: PropertyKey::new(namespace, pid),
        name,
        display,
        field_type,
        writable,
    }
}

use FieldType::{Text, UnsignedInt};

/// Indexed by ordinal.
const TABLE: [Entry; 17] = [
    entry(SUMMARY_INFO, 4, "AUTHOR", "Author", Text, true),
    entry(SUMMARY_INFO, 6, "COMMENT", "Comment", Text, true),
    entry(MEDIA_FILE_SUMMARY, 11, "COPYRIGHT", "Copyright", Text, true),
    entry(SUMMARY_INFO, 5, "KEYWORDS", "Keywords", Text, true),
    entry(DOC_SUMMARY_INFO, 28, "LANGUAGE", "Language", Text, true),
    entry(MEDIA_EXTENDED, 38, "SUB_TITLE", "Subtitle", Text, true),
    entry(MEDIA_EXTENDED, 5, "YEAR", "Year", UnsignedInt, true),
    entry(SUMMARY_INFO, 2, "TITLE", "Title", Text, true),
    entry(MEDIA_FILE_SUMMARY, 20, "DIRECTOR", "Director", Text, true),
    entry(AUDIO_SUMMARY, 7, "AUDIO_CHANNEL_COUNT", "Audio Channel Count", UnsignedInt, false),
    entry(AUDIO_SUMMARY, 4, "AUDIO_ENCODING_BITRATE", "Audio Encoding Bitrate", UnsignedInt, false),
    entry(MEDIA_FILE_SUMMARY, 32, "AUTHOR_URL", "Author URL", Text, true),
    entry(MEDIA_FILE_SUMMARY, 36, "ENCODED_BY", "Encoded By", Text, true),
    entry(AUDIO_SUMMARY, 3, "DURATION", "Duration", UnsignedInt, false),
    entry(AUDIO_SUMMARY, 2, "AUDIO_FORMAT", "Audio Format", Text, false),
    entry(AUDIO_SUMMARY, 5, "AUDIO_SAMPLE_RATE", "Audio Sample Rate", UnsignedInt, false),
    entry(AUDIO_SUMMARY, 6, "AUDIO_SAMPLE_SIZE", "Audio Sample Size", UnsignedInt, false),
];

impl MediaProperty {
    pub const ALL: [MediaProperty; 17] = [
        Self::Author,
        Self::Comment,
        Self::Copyright,
        Self::Keywords,
        Self::Language,
        Self::SubTitle,
        Self::Year,
        Self::Title,
        Self::Director,
        Self::AudioChannelCount,
        Self::AudioEncodingBitrate,
        Self::AuthorUrl,
        Self::EncodedBy,
        Self::Duration,
        Self::AudioFormat,
        Self::AudioSampleRate,
        Self::AudioSampleSize,
    ];

    /// Map a public ordinal back to a field; anything outside `[0, 17)` is rejected.
    pub fn from_ordinal(ordinal: i32) -> Result<Self, MediaError> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(MediaError::UnknownOrdinal(ordinal))
    }

    pub fn ordinal(self) -> i32 {
        self as i32
    }

    fn entry(self) -> &'static Entry {
        &TABLE[self as usize]
    }

    pub fn key(self) -> PropertyKey {
        self.entry().key
    }

    /// Symbolic name, e.g. `"SUB_TITLE"`.
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Human-facing name used in error messages, e.g. `"Subtitle"`.
    pub fn display_name(self) -> &'static str {
        self.entry().display
    }

    pub fn field_type(self) -> FieldType {
        self.entry().field_type
    }

    /// Stream fields (duration, bitrate, ...) are derived from the media data and
    /// cannot be written.
    pub fn is_writable(self) -> bool {
        self.entry().writable
    }

    /// Reverse lookup; `None` for keys outside the registry.
    pub fn from_key(key: &PropertyKey) -> Option<Self> {
        name_of(key)
    }
}

impl fmt::Display for MediaProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for MediaProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Ordinal -> backend key. Pure; no I/O.
pub fn resolve(ordinal: i32) -> Result<PropertyKey, MediaError> {
    MediaProperty::from_ordinal(ordinal).map(MediaProperty::key)
}

static BY_CANONICAL: LazyLock<HashMap<String, MediaProperty>> = LazyLock::new(|| {
    MediaProperty::ALL
        .iter()
        .map(|p| (p.key().canonical(), *p))
        .collect()
});

/// Backend key -> field, via the canonical text form of the key.
pub fn name_of(key: &PropertyKey) -> Option<MediaProperty> {
    BY_CANONICAL.get(&key.canonical()).copied()
}

/// Build the reverse table eagerly (called from `init`).
pub(crate) fn warm_up() {
    LazyLock::force(&BY_CANONICAL);
}
