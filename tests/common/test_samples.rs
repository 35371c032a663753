//! Utilities for building synthetic test samples.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

/// Writes `bytes` into a fresh temporary directory and returns the directory
/// (which must outlive the test) together with the file path.
pub fn write_sample(filename: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join(filename);
    let mut file = std::fs::File::create(&path).expect("failed to create sample");
    file.write_all(bytes).expect("failed to write sample");
    (dir, path)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A FLAC metadata block to be serialized by [`flac_stream`].
pub struct Block {
    pub block_type: u8,
    pub body: Vec<u8>,
}

/// `fLaC` followed by `blocks`, with the last-block flag on the final one.
pub fn flac_stream(blocks: &[Block]) -> Vec<u8> {
    let mut out = b"fLaC".to_vec();
    for (i, block) in blocks.iter().enumerate() {
        let last = if i + 1 == blocks.len() { 0x80 } else { 0 };
        out.push(last | block.block_type);
        out.extend_from_slice(&(block.body.len() as u32).to_be_bytes()[1..]);
        out.extend_from_slice(&block.body);
    }
    out
}

pub fn streaminfo() -> Block {
    Block {
        block_type: 0,
        body: vec![0; 34],
    }
}

/// A Vorbis comment body: empty vendor, then the entries as given.
pub fn vorbis_comment(entries: &[&str]) -> Vec<u8> {
    let mut out = 0u32.to_le_bytes().to_vec();
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        out.extend_from_slice(entry.as_bytes());
    }
    out
}

pub fn comment_block(entries: &[&str]) -> Block {
    Block {
        block_type: 4,
        body: vorbis_comment(entries),
    }
}

/// A PICTURE block body whose data-length field is `declared_len`,
/// regardless of how many bytes of `data` actually follow.
pub fn picture_body(picture_type: u32, mime: &str, data: &[u8], declared_len: u32) -> Vec<u8> {
    let mut out = picture_type.to_be_bytes().to_vec();
    out.extend_from_slice(&(mime.len() as u32).to_be_bytes());
    out.extend_from_slice(mime.as_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    for value in [300u32, 300, 24, 0] {
        out.extend_from_slice(&value.to_be_bytes());
    }
    out.extend_from_slice(&declared_len.to_be_bytes());
    out.extend_from_slice(data);
    out
}

pub fn picture_block(picture_type: u32, mime: &str, data: &[u8]) -> Block {
    Block {
        block_type: 6,
        body: picture_body(picture_type, mime, data, data.len() as u32),
    }
}

/// A single Ogg page holding whole packets shorter than 255 bytes each.
pub fn ogg_page(sequence: u32, header_type: u8, packets: &[&[u8]]) -> Vec<u8> {
    let mut out = b"OggS".to_vec();
    out.push(0);
    out.push(header_type);
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&sequence.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.push(packets.len() as u8);
    for packet in packets {
        out.push(packet.len() as u8);
    }
    for packet in packets {
        out.extend_from_slice(packet);
    }
    out
}

/// An ID3v2.3 tag with the given Latin-1 text frames.
pub fn id3v23(frames: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (id, value) in frames {
        body.extend_from_slice(id.as_bytes());
        body.extend_from_slice(&(value.len() as u32 + 1).to_be_bytes());
        body.extend_from_slice(&[0, 0, 0]);
        body.extend_from_slice(value.as_bytes());
    }
    let len = body.len() as u32;
    let mut out = b"ID3\x03\x00\x00".to_vec();
    out.extend_from_slice(&[
        ((len >> 21) & 0x7F) as u8,
        ((len >> 14) & 0x7F) as u8,
        ((len >> 7) & 0x7F) as u8,
        (len & 0x7F) as u8,
    ]);
    out.extend_from_slice(&body);
    out
}

/// An ID3v1.1 trailer.
pub fn id3v1(title: &str, artist: &str, year: &str, track: u8, genre: u8) -> Vec<u8> {
    let mut out = b"TAG".to_vec();
    for (text, width) in [(title, 30), (artist, 30), ("", 30), (year, 4), ("", 28)] {
        let mut field = text.as_bytes().to_vec();
        field.resize(width, 0);
        out.extend_from_slice(&field);
    }
    out.extend_from_slice(&[0, track, genre]);
    out
}

/// A few MPEG-1 Layer III frame headers standing in for audio.
pub fn mpeg_frames() -> Vec<u8> {
    let mut out = Vec::new();
    for _ in 0..4 {
        out.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        out.extend_from_slice(&[0; 60]);
    }
    out
}
