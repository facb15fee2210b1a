//! core/tags/write.rs
//! Stage single property values into an in-memory ID3 tag.
//!
//! Semantics:
//! - `Empty` or "" => remove that frame
//! - any other text is written exactly as given (no trimming)
//! - text fields only take text, `Year` only takes a number

use id3::frame::{Comment, Content, ExtendedText};
use id3::{Frame, Tag, TagLike, Timestamp, Version};

use super::read::{DIRECTOR_DESC, KEYWORDS_DESC};
use super::util::frame_text;
use crate::core::registry::MediaProperty;
use crate::core::store::Status;
use crate::core::types::PropertyValue;

/// Helper: set/remove a plain text frame (T***)
fn set_text_opt(tag: &mut Tag, id: &str, v: Option<&str>) {
    match v {
        Some(s) => tag.set_text(id, s.to_string()),
        None => {
            let _ = tag.remove(id);
        }
    }
}

/// Helper: replace or remove a TXXX frame identified by its description
fn set_user_text_opt(tag: &mut Tag, description: &str, v: Option<&str>) {
    tag.remove_extended_text(Some(description), None);
    if let Some(s) = v {
        let _ = tag.add_frame(ExtendedText {
            description: description.to_string(),
            value: s.to_string(),
        });
    }
}

/// Helper: replace or remove a URL frame (W***)
fn set_link_opt(tag: &mut Tag, id: &str, v: Option<&str>) {
    let _ = tag.remove(id);
    if let Some(url) = v {
        let _ = tag.add_frame(Frame::with_content(id, Content::Link(url.to_string())));
    }
}

/// Comment (COMM): replace with a single "eng" comment
fn set_comment_opt(tag: &mut Tag, v: Option<&str>) {
    let _ = tag.remove("COMM");
    if let Some(s) = v {
        let _ = tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: String::new(),
            text: s.to_string(),
        });
    }
}

/// Largest year an ID3 timestamp (`yyyy`) can carry.
pub(crate) const MAX_YEAR: u32 = 9999;

/// ID3v2.4 dropped TYER in favour of TDRC; write whichever the target version reads.
/// `year` must already be checked against [`MAX_YEAR`].
fn set_year_opt(tag: &mut Tag, year: Option<i32>, version: Version) {
    tag.remove_year();
    tag.remove_date_recorded();

    let Some(year) = year else {
        return;
    };

    match version {
        Version::Id3v24 => tag.set_date_recorded(Timestamp {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
        }),
        _ => tag.set_year(year),
    }
}

/// Stage `value` for `property` in `tag`. Read-only properties never get here.
pub(crate) fn apply(
    tag: &mut Tag,
    property: MediaProperty,
    value: &PropertyValue,
    version: Version,
) -> Result<(), Status> {
    if property == MediaProperty::Year {
        let year = match value {
            PropertyValue::Empty => None,
            other => {
                let n = other
                    .as_integer()
                    .ok_or_else(|| Status::invalid_arg("YEAR takes a numeric value"))?;
                let year = u32::try_from(n)
                    .ok()
                    .filter(|y| *y <= MAX_YEAR)
                    .and_then(|y| i32::try_from(y).ok())
                    .ok_or_else(|| Status::invalid_arg(format!("YEAR out of range: {n}")))?;
                Some(year)
            }
        };
        set_year_opt(tag, year, version);
        return Ok(());
    }

    if value.is_numeric() {
        return Err(Status::invalid_arg(format!(
            "{} takes a text value",
            property.name()
        )));
    }

    let text = frame_text(value);
    let text = text.as_deref();

    match property {
        MediaProperty::Title => set_text_opt(tag, "TIT2", text),
        MediaProperty::SubTitle => set_text_opt(tag, "TIT3", text),
        MediaProperty::Author => set_text_opt(tag, "TPE1", text),
        MediaProperty::Copyright => set_text_opt(tag, "TCOP", text),
        MediaProperty::Language => set_text_opt(tag, "TLAN", text),
        MediaProperty::EncodedBy => set_text_opt(tag, "TENC", text),
        MediaProperty::AuthorUrl => set_link_opt(tag, "WOAR", text),
        MediaProperty::Comment => set_comment_opt(tag, text),
        MediaProperty::Keywords => set_user_text_opt(tag, KEYWORDS_DESC, text),
        MediaProperty::Director => set_user_text_opt(tag, DIRECTOR_DESC, text),
        other => {
            return Err(Status::access_denied(format!(
                "{} is not stored in the tag",
                other.name()
            )));
        }
    }

    Ok(())
}
