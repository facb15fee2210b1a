//! Shared fixtures: generated PCM WAV files and a plain text file in a temp dir.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

pub const SAMPLE_RATE: u32 = 8000;
pub const CHANNELS: u16 = 2;
pub const BITS: u16 = 16;

/// One second of 16-bit stereo silence as a canonical PCM WAV.
pub fn wav_bytes() -> Vec<u8> {
    let block_align = CHANNELS * (BITS / 8);
    let data_len = SAMPLE_RATE * u32::from(block_align);

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&(SAMPLE_RATE * u32::from(block_align)).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(out.len() + data_len as usize, 0);
    out
}

pub struct Fixture {
    _dir: TempDir,
    pub wav: PathBuf,
    pub text: PathBuf,
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let wav = dir.path().join("tone.wav");
    let text = dir.path().join("notes.txt");
    fs::write(&wav, wav_bytes()).expect("write wav");
    fs::write(&text, "just some notes, nothing to decode here\n").expect("write txt");
    Fixture {
        _dir: dir,
        wav,
        text,
    }
}
