//! Ogg streams carrying Vorbis, Opus or FLAC.
//!
//! Page layout (27-byte header, little-endian):
//! - Capture pattern `OggS` (4 bytes)
//! - Version (1 byte), header type (1 byte)
//! - Granule position (8 bytes)
//! - Serial number (4 bytes), page sequence (4 bytes), CRC (4 bytes)
//! - Segment count (1 byte), followed by the segment table
//!
//! The comment header is always the second packet of the logical stream.

use std::io::{Read, Seek, SeekFrom};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use byteorder::LittleEndian;

use crate::cursor::ByteCursor;
use crate::extractor::ExtractorConfig;
use crate::parsers::{flac, read_body, vorbis};
use crate::sniff::read_up_to;
use crate::tags::ParsedTags;
use crate::Error;
use crate::Result;

pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

const PAGE_HEADER_LEN: u64 = 27;
const PICTURE_KEY: &str = "METADATA_BLOCK_PICTURE";

/// The codec carried by the first logical stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OggCodec {
    Vorbis,
    Opus,
    Flac,
}

impl OggCodec {
    fn identify(packet: &[u8]) -> Option<Self> {
        if packet.starts_with(b"\x01vorbis") {
            Some(OggCodec::Vorbis)
        } else if packet.starts_with(b"OpusHead") {
            Some(OggCodec::Opus)
        } else if packet.starts_with(b"\x7fFLAC") {
            Some(OggCodec::Flac)
        } else {
            None
        }
    }

    /// Returns the Vorbis comment body inside the comment packet, if the packet
    /// has the header this codec expects.
    fn comment_body(self, packet: &[u8]) -> Option<&[u8]> {
        match self {
            OggCodec::Vorbis => packet.strip_prefix(b"\x03vorbis"),
            OggCodec::Opus => packet.strip_prefix(b"OpusTags"),
            OggCodec::Flac => {
                // A bare FLAC metadata block: type in the low 7 bits of byte 0.
                if packet.len() >= 4 && packet[0] & 0x7F == flac::BLOCK_VORBIS_COMMENT {
                    Some(&packet[4..])
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug)]
struct Page {
    serial: u32,
    lacing: Vec<u8>,
    body: Vec<u8>,
}

fn read_page<R: Read>(reader: &mut R) -> Result<Option<Page>> {
    let raw = read_up_to(reader, PAGE_HEADER_LEN)?;
    if raw.is_empty() {
        return Ok(None);
    }
    if (raw.len() as u64) < PAGE_HEADER_LEN {
        return Err(Error::truncated(PAGE_HEADER_LEN, raw.len() as u64));
    }

    let mut header = ByteCursor::new(&raw);
    if header.take(4)? != OGG_SIGNATURE {
        return Err(Error::InvalidSignature);
    }
    let _version = header.read_u8()?;
    let _header_type = header.read_u8()?;
    header.skip(8)?; // granule position
    let serial = header.read_u32::<LittleEndian>()?;
    let _sequence = header.read_u32::<LittleEndian>()?;
    let _crc = header.read_u32::<LittleEndian>()?;
    let segments = header.read_u8()?;

    let lacing = read_body(reader, segments.into())?;
    let body_len: u64 = lacing.iter().map(|&l| u64::from(l)).sum();
    let body = read_body(reader, body_len)?;

    Ok(Some(Page {
        serial,
        lacing,
        body,
    }))
}

/// Reassembles the first `wanted` packets of the first logical stream.
fn read_header_packets<R: Read>(
    reader: &mut R,
    wanted: usize,
    config: &ExtractorConfig,
) -> Result<Vec<Vec<u8>>> {
    let mut packets = Vec::with_capacity(wanted);
    let mut current = Vec::new();
    let mut stream_serial = None;
    let mut pages = 0usize;

    while packets.len() < wanted {
        if pages >= config.max_ogg_pages {
            log::warn!("No comment header within {} Ogg pages", pages);
            break;
        }
        let page = match read_page(reader)? {
            Some(page) => page,
            None => {
                // Stream ended with a packet still open.
                if !current.is_empty() {
                    return Err(Error::truncated(current.len() as u64 + 1, current.len() as u64));
                }
                break;
            }
        };
        pages += 1;

        let serial = *stream_serial.get_or_insert(page.serial);
        if page.serial != serial {
            log::debug!("Skipping page of multiplexed stream {}", page.serial);
            continue;
        }

        let mut offset = 0usize;
        for &len in &page.lacing {
            let len = usize::from(len);
            current.extend_from_slice(&page.body[offset..offset + len]);
            offset += len;

            if current.len() as u64 > u64::from(config.max_tag_size) {
                return Err(Error::truncated(
                    current.len() as u64,
                    config.max_tag_size.into(),
                ));
            }
            if len < 255 {
                packets.push(std::mem::take(&mut current));
                if packets.len() == wanted {
                    break;
                }
            }
        }
    }

    log::debug!("Read {} header packets from {} Ogg pages", packets.len(), pages);
    Ok(packets)
}

/// Reads the comment header of an Ogg stream.
pub fn parse<R: Read + Seek>(reader: &mut R, config: &ExtractorConfig) -> Result<ParsedTags> {
    reader.seek(SeekFrom::Start(0))?;

    let packets = read_header_packets(reader, 2, config)?;
    let mut tags = ParsedTags::default();

    let codec = match packets.first().and_then(|p| OggCodec::identify(p)) {
        Some(codec) => codec,
        None => {
            log::warn!("Unsupported Ogg codec");
            return Ok(tags);
        }
    };
    log::debug!("Ogg codec: {:?}", codec);

    let body = match packets.get(1).and_then(|p| codec.comment_body(p)) {
        Some(body) => body,
        None => {
            log::warn!("Missing {:?} comment header", codec);
            return Ok(tags);
        }
    };

    vorbis::parse_comments(body, &mut tags.properties)?;

    if let Some(encoded) = tags.properties.remove(PICTURE_KEY) {
        if config.include_artwork {
            for value in encoded {
                match BASE64.decode(value.trim()) {
                    Ok(bytes) => tags.pictures.push(flac::parse_picture(&bytes)?),
                    Err(err) => log::warn!("Dropping undecodable {}: {}", PICTURE_KEY, err),
                }
            }
        }
    }

    Ok(tags)
}
