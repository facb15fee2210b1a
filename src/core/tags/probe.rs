//! core/tags/probe.rs
//! Stream properties (duration, rate, channels, ...) from a Symphonia probe.
//!
//! Probing doubles as the media-file check: whatever Symphonia can't demux is reported
//! with the "type unknown" status.

use std::fs::File;
use std::io;
use std::path::Path;

use symphonia::core::codecs::{
    CODEC_TYPE_AAC, CODEC_TYPE_FLAC, CODEC_TYPE_MP3, CODEC_TYPE_PCM_F32LE, CODEC_TYPE_PCM_F64LE,
    CODEC_TYPE_PCM_S16LE, CODEC_TYPE_PCM_S24LE, CODEC_TYPE_PCM_S32LE, CODEC_TYPE_PCM_U8,
    CodecParameters, CodecType,
};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::{debug, trace};

use crate::core::registry::MediaProperty;
use crate::core::store::Status;
use crate::core::types::PropertyValue;

/// 100ns ticks per second (the unit durations are reported in).
const TICKS_PER_SECOND: u64 = 10_000_000;

/// What the default track looked like when the file was opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StreamInfo {
    pub duration: Option<u64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    pub sample_size: Option<u32>,
    pub bitrate: Option<u32>,
    pub format: Option<String>,
}

impl StreamInfo {
    /// Store value for one of the stream properties; `Empty` for anything else.
    pub(crate) fn value(&self, property: MediaProperty) -> PropertyValue {
        let value = match property {
            MediaProperty::Duration => self.duration.map(PropertyValue::UInt64),
            MediaProperty::AudioSampleRate => self.sample_rate.map(PropertyValue::UInt32),
            MediaProperty::AudioChannelCount => self.channels.map(PropertyValue::UInt32),
            MediaProperty::AudioSampleSize => self.sample_size.map(PropertyValue::UInt32),
            MediaProperty::AudioEncodingBitrate => self.bitrate.map(PropertyValue::UInt32),
            MediaProperty::AudioFormat => self.format.clone().map(PropertyValue::Text),
            _ => None,
        };
        value.unwrap_or_default()
    }
}

/// Probe `file` (already opened by the caller) and describe its default track.
pub(crate) fn probe(file: File, path: &Path, file_len: u64) -> Result<StreamInfo, Status> {
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| probe_status(path, e))?;

    let format = probed.format;
    let Some(track) = format.default_track() else {
        debug!(path = %path.display(), "no default track");
        return Err(Status::unknown_type());
    };

    let info = stream_info(&track.codec_params, file_len);
    trace!(path = %path.display(), ?info, "probed");
    Ok(info)
}

fn probe_status(path: &Path, err: SymphoniaError) -> Status {
    match err {
        SymphoniaError::IoError(e) if e.kind() != io::ErrorKind::UnexpectedEof => {
            Status::from_io(&e)
        }
        other => {
            debug!(path = %path.display(), error = %other, "format probe failed");
            Status::unknown_type()
        }
    }
}

fn stream_info(params: &CodecParameters, file_len: u64) -> StreamInfo {
    let duration = duration_from_params(params.time_base, params.n_frames);
    let channels = params.channels.map(|c| c.count() as u32);
    let sample_size = params.bits_per_sample.or(params.bits_per_coded_sample);

    let bitrate = match (is_pcm(params.codec), params.sample_rate, channels, sample_size) {
        (true, Some(rate), Some(ch), Some(bits)) => rate.checked_mul(ch).and_then(|v| v.checked_mul(bits)),
        _ => duration.and_then(|ticks| average_bitrate(file_len, ticks)),
    };

    StreamInfo {
        duration,
        sample_rate: params.sample_rate,
        channels,
        sample_size,
        bitrate,
        format: format_tag(params.codec).map(format_guid),
    }
}

/// Duration in 100ns ticks: time_base + n_frames when both are known.
fn duration_from_params(time_base: Option<TimeBase>, n_frames: Option<u64>) -> Option<u64> {
    let tb = time_base?;
    let frames = n_frames?;

    let t = tb.calc_time(frames);
    // Time is { seconds: u64, frac: f64 } in symphonia 0.5.x.
    let frac = (t.frac * TICKS_PER_SECOND as f64).round() as u64;
    t.seconds.checked_mul(TICKS_PER_SECOND)?.checked_add(frac)
}

/// Bits per second over the whole file, for compressed streams.
fn average_bitrate(file_len: u64, ticks: u64) -> Option<u32> {
    if ticks == 0 {
        return None;
    }
    let bps = (u128::from(file_len) * 8 * u128::from(TICKS_PER_SECOND)) / u128::from(ticks);
    u32::try_from(bps).ok()
}

fn is_pcm(codec: CodecType) -> bool {
    [
        CODEC_TYPE_PCM_U8,
        CODEC_TYPE_PCM_S16LE,
        CODEC_TYPE_PCM_S24LE,
        CODEC_TYPE_PCM_S32LE,
        CODEC_TYPE_PCM_F32LE,
        CODEC_TYPE_PCM_F64LE,
    ]
    .contains(&codec)
}

/// WAVE format tag for the codecs we recognize.
fn format_tag(codec: CodecType) -> Option<u16> {
    if codec == CODEC_TYPE_PCM_F32LE || codec == CODEC_TYPE_PCM_F64LE {
        Some(0x0003)
    } else if is_pcm(codec) {
        Some(0x0001)
    } else if codec == CODEC_TYPE_MP3 {
        Some(0x0055)
    } else if codec == CODEC_TYPE_AAC {
        Some(0x1610)
    } else if codec == CODEC_TYPE_FLAC {
        Some(0xF1AC)
    } else {
        None
    }
}

/// Audio subtype GUID built from a WAVE format tag.
fn format_guid(tag: u16) -> String {
    format!("{{{tag:08X}-0000-0010-8000-00AA00389B71}}")
}
