//! ID3v2.3 and ID3v2.4 tags.
//!
//! Text frames are mapped onto the same upper-case keys Vorbis comments use,
//! so the normalizer sees one vocabulary regardless of container.

use std::io::{Read, Seek, SeekFrom};

use byteorder::BigEndian;

use crate::cursor::ByteCursor;
use crate::extractor::ExtractorConfig;
use crate::parsers::{id3v1, latin1, read_body};
use crate::sniff::read_up_to;
use crate::tags::{ParsedTags, PictureBlock, PictureType};
use crate::Error;
use crate::Result;

pub const HEADER_LEN: u64 = 10;

const FLAG_UNSYNCHRONISATION: u8 = 0x80;
const FLAG_EXTENDED_HEADER: u8 = 0x40;
const FLAG_FOOTER: u8 = 0x10;

/// Text frame id to property key.
const TEXT_FRAMES: &[(&str, &str)] = &[
    ("TIT2", "TITLE"),
    ("TPE1", "ARTIST"),
    ("TALB", "ALBUM"),
    ("TPE2", "ALBUMARTIST"),
    ("TCON", "GENRE"),
    ("TRCK", "TRACKNUMBER"),
    ("TPOS", "DISCNUMBER"),
    ("TDRC", "DATE"),
    ("TYER", "DATE"),
    ("TCOM", "COMPOSER"),
];

/// Decodes a 28-bit syncsafe integer (7 bits per byte).
pub fn syncsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Full on-disk size of the tag whose 10-byte header is given, header and
/// footer included.
pub fn total_tag_len(header: &[u8; 10]) -> u64 {
    let body = u64::from(syncsafe([header[6], header[7], header[8], header[9]]));
    let footer = if header[5] & FLAG_FOOTER != 0 { HEADER_LEN } else { 0 };
    HEADER_LEN + body + footer
}

/// Reads an ID3v2 tag at `offset`. No tag there, or an unsupported major
/// version, yields empty tags.
pub fn parse<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    config: &ExtractorConfig,
) -> Result<ParsedTags> {
    let mut tags = ParsedTags::default();

    reader.seek(SeekFrom::Start(offset))?;
    let header = read_up_to(reader, HEADER_LEN)?;
    if header.len() < HEADER_LEN as usize || !header.starts_with(b"ID3") {
        return Ok(tags);
    }

    let major = header[3];
    let flags = header[5];
    let size = syncsafe([header[6], header[7], header[8], header[9]]);

    if major != 3 && major != 4 {
        log::warn!("Ignoring unsupported ID3v2.{} tag", major);
        return Ok(tags);
    }
    if size > config.max_tag_size {
        return Err(Error::truncated(size.into(), config.max_tag_size.into()));
    }

    let mut body = read_body(reader, size.into())?;
    let tag_unsynchronised = flags & FLAG_UNSYNCHRONISATION != 0;
    // v2.3 unsynchronises the whole tag; v2.4 frame sizes count the stuffed
    // bytes, so reversal happens per frame.
    if tag_unsynchronised && major == 3 {
        body = remove_unsynchronisation(&body);
    }
    log::debug!("ID3v2.{} tag, {} bytes", major, size);

    let mut cursor = ByteCursor::new(&body);
    if flags & FLAG_EXTENDED_HEADER != 0 {
        skip_extended_header(&mut cursor, major)?;
    }

    let all_frames_unsynchronised = tag_unsynchronised && major == 4;
    parse_frames(&mut cursor, major, all_frames_unsynchronised, config, &mut tags)?;
    Ok(tags)
}

fn skip_extended_header(cursor: &mut ByteCursor<'_>, major: u8) -> Result<()> {
    let raw = cursor.read_u32::<BigEndian>()?;
    if major == 4 {
        // v2.4: syncsafe, includes its own size field.
        let size = syncsafe(raw.to_be_bytes()) as usize;
        cursor.skip(size.saturating_sub(4))
    } else {
        cursor.skip(raw as usize)
    }
}

fn parse_frames(
    cursor: &mut ByteCursor<'_>,
    major: u8,
    all_frames_unsynchronised: bool,
    config: &ExtractorConfig,
    tags: &mut ParsedTags,
) -> Result<()> {
    while cursor.remaining() >= HEADER_LEN as usize {
        let id = cursor.read_fixed_string(4)?;
        if id.starts_with('\0') {
            break; // padding
        }

        let raw_size = cursor.read_u32::<BigEndian>()?;
        let size = if major == 4 {
            syncsafe(raw_size.to_be_bytes())
        } else {
            raw_size
        };
        let frame_flags = cursor.read_u16::<BigEndian>()?;
        let mut data = cursor.take(size as usize)?.to_vec();

        let flags = FrameFlags::decode(major, frame_flags);
        if flags.compressed || flags.encrypted {
            log::debug!("Skipping compressed or encrypted frame {}", id);
            continue;
        }
        // Extra header bytes come in flag order: group id, then data length.
        if flags.grouped {
            if data.is_empty() {
                continue;
            }
            data.remove(0);
        }
        if flags.length_indicator {
            if data.len() < 4 {
                continue;
            }
            data.drain(..4);
        }
        if flags.unsynchronised || all_frames_unsynchronised {
            data = remove_unsynchronisation(&data);
        }

        if id == "APIC" {
            if config.include_artwork {
                match parse_apic(&data) {
                    Some(picture) => tags.pictures.push(picture),
                    None => log::warn!("Dropping malformed APIC frame"),
                }
            }
        } else if id == "TXXX" {
            if let Some((description, values)) = parse_user_text(&data) {
                for value in values {
                    tags.properties.insert(&description, value);
                }
            }
        } else if let Some(&(_, key)) = TEXT_FRAMES.iter().find(|(frame, _)| *frame == id) {
            let Some(values) = parse_text_frame(&data) else {
                continue;
            };
            for value in values {
                let value = if key == "GENRE" {
                    resolve_genre(&value)
                } else {
                    value
                };
                tags.properties.insert(key, value);
            }
        } else {
            log::debug!("Skipping frame {} ({} bytes)", id, size);
        }
    }
    Ok(())
}

/// Per-frame format flags that change how the payload is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FrameFlags {
    grouped: bool,
    compressed: bool,
    encrypted: bool,
    unsynchronised: bool,
    length_indicator: bool,
}

impl FrameFlags {
    fn decode(major: u8, raw: u16) -> Self {
        if major == 4 {
            Self {
                grouped: raw & 0x0040 != 0,
                compressed: raw & 0x0008 != 0,
                encrypted: raw & 0x0004 != 0,
                unsynchronised: raw & 0x0002 != 0,
                length_indicator: raw & 0x0001 != 0,
            }
        } else {
            Self {
                grouped: raw & 0x0020 != 0,
                compressed: raw & 0x0080 != 0,
                encrypted: raw & 0x0040 != 0,
                unsynchronised: false,
                length_indicator: false,
            }
        }
    }
}

/// Reverses the `FF 00` -> `FF` byte stuffing.
fn remove_unsynchronisation(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev_ff = false;
    for &b in data {
        if prev_ff && b == 0x00 {
            prev_ff = false;
            continue;
        }
        out.push(b);
        prev_ff = b == 0xFF;
    }
    out
}

fn parse_text_frame(data: &[u8]) -> Option<Vec<String>> {
    let (&encoding, text) = data.split_first()?;
    decode_text(encoding, text)
}

fn parse_user_text(data: &[u8]) -> Option<(String, Vec<String>)> {
    let (&encoding, rest) = data.split_first()?;
    let (description, value) = split_terminated(encoding, rest);
    let description = decode_text(encoding, description)?.into_iter().next()?;
    if description.is_empty() {
        return None;
    }
    Some((description, decode_text(encoding, value)?))
}

fn parse_apic(data: &[u8]) -> Option<PictureBlock> {
    let (&encoding, rest) = data.split_first()?;
    let mime_end = rest.iter().position(|&b| b == 0)?;
    let mime_type = latin1(&rest[..mime_end]);
    let rest = &rest[mime_end + 1..];
    let (&picture_type, rest) = rest.split_first()?;
    let (description, picture) = split_terminated(encoding, rest);
    let description = decode_text(encoding, description)
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();

    Some(PictureBlock {
        picture_type: PictureType::from(u32::from(picture_type)),
        mime_type,
        description,
        width: 0,
        height: 0,
        color_depth: 0,
        color_count: 0,
        data: picture.to_vec(),
    })
}

/// Splits at the first string terminator of the given encoding: a single NUL
/// for Latin-1/UTF-8, an aligned double NUL for UTF-16.
fn split_terminated(encoding: u8, bytes: &[u8]) -> (&[u8], &[u8]) {
    match encoding {
        1 | 2 => {
            let mut i = 0;
            while i + 1 < bytes.len() {
                if bytes[i] == 0 && bytes[i + 1] == 0 {
                    return (&bytes[..i], &bytes[i + 2..]);
                }
                i += 2;
            }
            (bytes, &[])
        }
        _ => match bytes.iter().position(|&b| b == 0) {
            Some(i) => (&bytes[..i], &bytes[i + 1..]),
            None => (bytes, &[]),
        },
    }
}

/// Decodes an encoded string list. Values are NUL-separated; trailing empty
/// values are dropped.
fn decode_text(encoding: u8, bytes: &[u8]) -> Option<Vec<String>> {
    let text = match encoding {
        0 => latin1(bytes),
        1 => decode_utf16(bytes, None),
        2 => decode_utf16(bytes, Some(false)),
        3 => String::from_utf8_lossy(bytes).into_owned(),
        other => {
            log::warn!("Unknown ID3v2 text encoding {}", other);
            return None;
        }
    };

    let mut values: Vec<String> = text
        .split('\0')
        .map(|s| s.trim_start_matches('\u{FEFF}').to_string())
        .collect();
    while values.len() > 1 && values.last().map_or(false, String::is_empty) {
        values.pop();
    }
    Some(values)
}

/// `little_endian: None` means detect from a BOM, defaulting to big-endian.
fn decode_utf16(bytes: &[u8], little_endian: Option<bool>) -> String {
    let (little_endian, bytes) = match (little_endian, bytes) {
        (Some(le), bytes) => (le, bytes),
        (None, [0xFF, 0xFE, rest @ ..]) => (true, rest),
        (None, [0xFE, 0xFF, rest @ ..]) => (false, rest),
        (None, bytes) => (false, bytes),
    };

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16_lossy(&units)
}

/// Resolves `"(17)"`, `"17"` and `"(17)Refinement"` style TCON values.
fn resolve_genre(value: &str) -> String {
    let trimmed = value.trim();

    if let Ok(index) = trimmed.parse::<u8>() {
        if let Some(name) = id3v1::genre_name(index) {
            return name.to_string();
        }
    }

    if let Some(rest) = trimmed.strip_prefix('(') {
        if let Some((number, refinement)) = rest.split_once(')') {
            if !refinement.is_empty() {
                return refinement.to_string();
            }
            if let Some(name) = number.parse::<u8>().ok().and_then(id3v1::genre_name) {
                return name.to_string();
            }
        }
    }

    value.to_string()
}
