//! core/tags/read.rs
//! Load an ID3 tag from disk and pull single property values out of it.

use std::path::Path;

use id3::frame::Content;
use id3::{ErrorKind, Tag, TagLike};
use tracing::debug;

use super::util::{parse_u32, text_value};
use crate::core::registry::MediaProperty;
use crate::core::store::Status;
use crate::core::types::PropertyValue;

/// TXXX descriptions for fields ID3 has no dedicated frame for.
pub(crate) const KEYWORDS_DESC: &str = "KEYWORDS";
pub(crate) const DIRECTOR_DESC: &str = "DIRECTOR";

/// Read the file's tag (`id3` finds it in MP3, WAV and AIFF layouts alike);
/// a file without one starts from an empty tag.
pub(crate) fn load_tag(path: &Path) -> Result<Tag, Status> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(tag),
        Err(e) => match e.kind {
            ErrorKind::NoTag => {
                debug!(path = %path.display(), "no ID3 tag, starting empty");
                Ok(Tag::new())
            }
            ErrorKind::Io(io) => Err(Status::from_io(&io)),
            _ => Err(Status::invalid_data(format!("unreadable ID3 tag: {}", e.description))),
        },
    }
}

/// Value of one tag-backed property. Stream fields are not stored in the tag and
/// always come back `Empty` here, except the TLEN fallback for duration.
pub(crate) fn tag_value(tag: &Tag, property: MediaProperty) -> PropertyValue {
    match property {
        MediaProperty::Title => frame_value(tag, "TIT2"),
        MediaProperty::SubTitle => frame_value(tag, "TIT3"),
        MediaProperty::Author => frame_value(tag, "TPE1"),
        MediaProperty::Copyright => frame_value(tag, "TCOP"),
        MediaProperty::Language => frame_value(tag, "TLAN"),
        MediaProperty::EncodedBy => frame_value(tag, "TENC"),
        MediaProperty::AuthorUrl => frame_value(tag, "WOAR"),
        MediaProperty::Comment => first_comment(tag),
        MediaProperty::Keywords => user_text(tag, KEYWORDS_DESC),
        MediaProperty::Director => user_text(tag, DIRECTOR_DESC),
        MediaProperty::Year => year(tag),
        MediaProperty::Duration => tlen_duration(tag),
        MediaProperty::AudioChannelCount
        | MediaProperty::AudioEncodingBitrate
        | MediaProperty::AudioFormat
        | MediaProperty::AudioSampleRate
        | MediaProperty::AudioSampleSize => PropertyValue::Empty,
    }
}

/// Text-ish frame content. Link frames (W***) carry their URL as text.
fn frame_text(tag: &Tag, id: &str) -> Option<String> {
    let frame = tag.get(id)?;
    match frame.content() {
        Content::Text(s) => Some(s.clone()),
        Content::Link(s) => Some(s.clone()),
        _ => None,
    }
}

fn frame_value(tag: &Tag, id: &str) -> PropertyValue {
    frame_text(tag, id)
        .map(|s| text_value(&s))
        .unwrap_or_default()
}

fn first_comment(tag: &Tag) -> PropertyValue {
    for frame in tag.frames() {
        if frame.id() == "COMM" {
            if let Content::Comment(c) = frame.content() {
                return text_value(&c.text);
            }
        }
    }
    PropertyValue::Empty
}

fn user_text(tag: &Tag, description: &str) -> PropertyValue {
    tag.extended_texts()
        .find(|et| et.description == description)
        .map(|et| text_value(&et.value))
        .unwrap_or_default()
}

fn year(tag: &Tag) -> PropertyValue {
    tag.year()
        .or_else(|| tag.date_recorded().map(|ts| ts.year))
        .and_then(|y| u32::try_from(y).ok())
        .map(PropertyValue::UInt32)
        .unwrap_or_default()
}

/// TLEN holds milliseconds; the store reports duration in 100ns units.
fn tlen_duration(tag: &Tag) -> PropertyValue {
    parse_u32(frame_text(tag, "TLEN").as_deref())
        .map(|ms| PropertyValue::UInt64(u64::from(ms) * 10_000))
        .unwrap_or_default()
}
