//! core/tags/util.rs
//! Small conversion helpers shared by tag reading/writing.

use crate::core::types::PropertyValue;

/// ID3v2.4 separates multiple values inside one text frame with NUL.
pub(crate) const MULTI_VALUE_SEPARATOR: char = '\0';

/// Turn raw frame text into a store value:
/// - "" -> Empty
/// - "a" -> Text("a")
/// - "a\0b" -> TextSequence(["a", "b"])
pub(crate) fn text_value(s: &str) -> PropertyValue {
    if s.is_empty() {
        return PropertyValue::Empty;
    }

    let mut parts: Vec<String> = s
        .split(MULTI_VALUE_SEPARATOR)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();

    match parts.len() {
        0 => PropertyValue::Empty,
        1 => PropertyValue::Text(parts.remove(0)),
        _ => PropertyValue::TextSequence(parts),
    }
}

/// Inverse of [`text_value`] for anything textual. `None` means "remove the frame".
pub(crate) fn frame_text(value: &PropertyValue) -> Option<String> {
    match value {
        PropertyValue::Text(s) if !s.is_empty() => Some(s.clone()),
        PropertyValue::TextSequence(v) if !v.is_empty() => {
            Some(v.join(&MULTI_VALUE_SEPARATOR.to_string()))
        }
        _ => None,
    }
}

/// Parse strings like "3" or " 4004 " into u32.
pub(crate) fn parse_u32(s: Option<&str>) -> Option<u32> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_value_shapes() {
        assert_eq!(text_value(""), PropertyValue::Empty);
        assert_eq!(text_value("a"), PropertyValue::Text("a".into()));
        assert_eq!(
            text_value("a\0b"),
            PropertyValue::TextSequence(vec!["a".into(), "b".into()])
        );
        assert_eq!(text_value("a\0"), PropertyValue::Text("a".into()));
    }

    #[test]
    fn frame_text_joins_sequences() {
        let v = PropertyValue::TextSequence(vec!["a".into(), "b".into()]);
        assert_eq!(frame_text(&v).as_deref(), Some("a\0b"));
        assert_eq!(frame_text(&PropertyValue::Text(String::new())), None);
        assert_eq!(frame_text(&PropertyValue::UInt32(1)), None);
    }

    #[test]
    fn parse_u32_trims_and_rejects_garbage() {
        assert_eq!(parse_u32(Some(" 4004 ")), Some(4004));
        assert_eq!(parse_u32(Some("")), None);
        assert_eq!(parse_u32(Some("x")), None);
        assert_eq!(parse_u32(None), None);
    }
}
