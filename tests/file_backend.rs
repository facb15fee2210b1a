//! End-to-end checks of the façade over real files in a temp dir.

mod common;

use std::fs;

use common::{CHANNELS, SAMPLE_RATE, fixture, wav_bytes};
use mediaprops::{FieldValue, FileBackend, MediaError, MediaProperty, MediaProps, PropertyMap};

fn props() -> MediaProps<FileBackend> {
    MediaProps::new(FileBackend::default())
}

#[test]
fn media_file_detection() {
    let fx = fixture();
    let props = props();

    assert!(props.is_valid_media_file(&fx.wav));
    assert!(!props.is_valid_media_file(&fx.text));
}

#[test]
fn reading_a_text_file_is_not_a_media_file() {
    let fx = fixture();

    let err = props().read_string(&fx.text, MediaProperty::Title).unwrap_err();
    assert!(err.is_not_a_media_file(), "got {err:?}");
}

#[test]
fn missing_file_is_reported_before_opening() {
    let fx = fixture();
    let missing = fx.wav.with_file_name("gone.wav");

    let err = props().has_property(&missing, MediaProperty::Title).unwrap_err();
    assert!(matches!(err, MediaError::FileNotFound { .. }), "got {err:?}");
}

#[test]
fn title_round_trip_and_clear() {
    let fx = fixture();
    let props = props();

    assert!(!props.has_property(&fx.wav, MediaProperty::Title).expect("has"));
    assert_eq!(props.read_string(&fx.wav, MediaProperty::Title).expect("read"), None);

    props
        .write_string(&fx.wav, MediaProperty::Title, "Sample")
        .expect("write");
    assert_eq!(
        props.read_string(&fx.wav, MediaProperty::Title).expect("read").as_deref(),
        Some("Sample")
    );

    props.clear_property(&fx.wav, MediaProperty::Title).expect("clear");
    assert!(!props.has_property(&fx.wav, MediaProperty::Title).expect("has"));

    // Audio is untouched by tag writes.
    assert!(props.is_valid_media_file(&fx.wav));
}

#[test]
fn year_round_trip_and_absent_integer() {
    let fx = fixture();
    let props = props();

    assert_eq!(props.read_int(&fx.wav, MediaProperty::Year).expect("read"), -1);

    props.write_int(&fx.wav, MediaProperty::Year, 2024).expect("write");
    assert_eq!(props.read_int(&fx.wav, MediaProperty::Year).expect("read"), 2024);
}

#[test]
fn stream_fields_come_from_the_audio() {
    let fx = fixture();
    let props = props();

    assert_eq!(
        props.read_int(&fx.wav, MediaProperty::AudioChannelCount).expect("channels"),
        i64::from(CHANNELS)
    );
    assert_eq!(
        props.read_int(&fx.wav, MediaProperty::AudioSampleRate).expect("rate"),
        i64::from(SAMPLE_RATE)
    );
    assert_eq!(
        props.read_int(&fx.wav, MediaProperty::Duration).expect("duration"),
        10_000_000
    );
}

#[test]
fn stream_fields_are_read_only() {
    let fx = fixture();

    let err = props()
        .write_int(&fx.wav, MediaProperty::AudioSampleRate, 44_100)
        .unwrap_err();
    assert!(
        matches!(err, MediaError::ReadOnly { property: MediaProperty::AudioSampleRate }),
        "got {err:?}"
    );

    let err = props()
        .clear_property(&fx.wav, MediaProperty::Duration)
        .unwrap_err();
    assert!(matches!(err, MediaError::ReadOnly { .. }), "got {err:?}");
    assert_eq!(
        props().read_int(&fx.wav, MediaProperty::Duration).expect("duration"),
        10_000_000
    );
}

#[test]
fn text_round_trips_verbatim() {
    let fx = fixture();
    let props = props();

    for value in ["  Sample  ", "   ", "Title\n", "\tlead", "trail "] {
        props
            .write_string(&fx.wav, MediaProperty::Title, value)
            .expect("write");
        assert_eq!(
            props.read_string(&fx.wav, MediaProperty::Title).expect("read").as_deref(),
            Some(value),
            "{value:?}"
        );
    }

    // "" is the one text value that clears the frame.
    props.write_string(&fx.wav, MediaProperty::Title, "").expect("write");
    assert_eq!(props.read_string(&fx.wav, MediaProperty::Title).expect("read"), None);
}

#[test]
fn out_of_range_year_fails_and_keeps_the_old_one() {
    let fx = fixture();
    let props = props();

    props.write_int(&fx.wav, MediaProperty::Year, 2024).expect("write");

    let err = props
        .write_int(&fx.wav, MediaProperty::Year, 3_000_000_000)
        .unwrap_err();
    assert!(matches!(err, MediaError::Io { .. }), "got {err:?}");
    assert_eq!(props.read_int(&fx.wav, MediaProperty::Year).expect("read"), 2024);
}

#[test]
fn negative_integers_never_reach_the_file() {
    let fx = fixture();

    let err = props().write_int(&fx.wav, MediaProperty::Year, -5).unwrap_err();
    assert!(matches!(err, MediaError::NegativeValue { value: -5, .. }), "got {err:?}");
}

#[test]
fn read_all_lists_tags_and_stream_fields() {
    let fx = fixture();
    let props = props();

    let mut batch = PropertyMap::new();
    batch.insert(MediaProperty::Title, "Sample");
    batch.insert(MediaProperty::Author, "Someone");
    batch.insert(MediaProperty::Comment, "yo");
    props.write_all_properties(&fx.wav, &batch).expect("write all");

    let all = props.read_all_properties(&fx.wav).expect("read all");
    assert_eq!(all.text(MediaProperty::Title), Some("Sample"));
    assert_eq!(all.text(MediaProperty::Author), Some("Someone"));
    assert_eq!(all.text(MediaProperty::Comment), Some("yo"));
    assert_eq!(all.number(MediaProperty::AudioSampleRate), Some(i64::from(SAMPLE_RATE)));
    assert!(!all.contains(MediaProperty::Director));
}

#[test]
fn clear_all_keeps_stream_fields() {
    let fx = fixture();
    let props = props();

    props.write_string(&fx.wav, MediaProperty::Title, "Sample").expect("write");
    props.write_string(&fx.wav, MediaProperty::Keywords, "rock").expect("write");
    props.clear_all_properties(&fx.wav).expect("clear all");

    let all = props.read_all_properties(&fx.wav).expect("read all");
    assert!(!all.contains(MediaProperty::Title));
    assert!(!all.contains(MediaProperty::Keywords));
    assert!(all.contains(MediaProperty::Duration));
}

#[test]
fn copy_between_files() {
    let fx = fixture();
    let other = fx.wav.with_file_name("copy.wav");
    fs::write(&other, wav_bytes()).expect("write wav");
    let props = props();

    props.write_string(&fx.wav, MediaProperty::Director, "Someone").expect("write");
    props
        .copy_property(&fx.wav, &other, MediaProperty::Director)
        .expect("copy");

    assert_eq!(
        props.read_property(&other, MediaProperty::Director).expect("read"),
        FieldValue::Text("Someone".into())
    );
}

#[test]
fn strict_read_of_absent_property() {
    let fx = fixture();

    let err = props().read_property(&fx.wav, MediaProperty::Language).unwrap_err();
    assert!(matches!(err, MediaError::PropertyMissing { .. }), "got {err:?}");
}
