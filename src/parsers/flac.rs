//! FLAC metadata blocks.
//!
//! A FLAC stream starts with `fLaC` followed by a sequence of metadata blocks,
//! each with a 4-byte header:
//!
//! | bits | field |
//! |------|-------|
//! | 1    | last-block flag |
//! | 7    | block type |
//! | 24   | body length, big-endian |
//!
//! Only VORBIS_COMMENT and PICTURE bodies are interpreted. Everything else is
//! skipped by its declared length.

use std::io::{Read, Seek, SeekFrom};

use byteorder::BigEndian;

use crate::cursor::ByteCursor;
use crate::extractor::ExtractorConfig;
use crate::parsers::{read_body, vorbis};
use crate::sniff::read_up_to;
use crate::tags::{ParsedTags, PictureBlock, PictureType};
use crate::Error;
use crate::Result;

pub const FLAC_MAGIC: &[u8; 4] = b"fLaC";

const BLOCK_HEADER_LEN: u64 = 4;

pub const BLOCK_STREAMINFO: u8 = 0;
pub const BLOCK_PADDING: u8 = 1;
pub const BLOCK_VORBIS_COMMENT: u8 = 4;
pub const BLOCK_PICTURE: u8 = 6;

/// A decoded metadata block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub is_last: bool,
    pub block_type: u8,
    pub length: u32,
}

impl BlockHeader {
    pub fn from_u32(raw: u32) -> Self {
        Self {
            is_last: raw & 0x8000_0000 != 0,
            block_type: ((raw >> 24) & 0x7F) as u8,
            length: raw & 0x00FF_FFFF,
        }
    }
}

/// Reads the metadata blocks of a FLAC stream beginning at `start`.
pub fn parse<R: Read + Seek>(
    reader: &mut R,
    start: u64,
    config: &ExtractorConfig,
) -> Result<ParsedTags> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(start))?;

    let magic = read_up_to(reader, 4)?;
    if magic != FLAC_MAGIC {
        return Err(Error::InvalidSignature);
    }

    let mut tags = ParsedTags::default();
    let mut blocks = 0usize;

    loop {
        if blocks >= config.max_metadata_blocks {
            log::warn!(
                "Stopping after {} metadata blocks without a last-block flag",
                blocks
            );
            break;
        }

        let raw = read_body(reader, BLOCK_HEADER_LEN)?;
        let header = BlockHeader::from_u32(ByteCursor::new(&raw).read_u32::<BigEndian>()?);
        blocks += 1;

        let body_start = reader.stream_position()?;
        let available = stream_len.saturating_sub(body_start);
        if u64::from(header.length) > available {
            return Err(Error::truncated(header.length.into(), available));
        }

        log::debug!(
            "FLAC block {}: type {}, {} bytes{}",
            blocks,
            header.block_type,
            header.length,
            if header.is_last { " (last)" } else { "" }
        );

        match header.block_type {
            BLOCK_VORBIS_COMMENT => {
                let body = read_body(reader, header.length.into())?;
                vorbis::parse_comments(&body, &mut tags.properties)?;
            }
            BLOCK_PICTURE if config.include_artwork => {
                let body = read_body(reader, header.length.into())?;
                tags.pictures.push(parse_picture(&body)?);
            }
            _ => {
                reader.seek(SeekFrom::Current(i64::from(header.length)))?;
            }
        }

        if header.is_last {
            break;
        }
    }

    Ok(tags)
}

/// Parses a PICTURE block body. All integers are big-endian.
pub fn parse_picture(data: &[u8]) -> Result<PictureBlock> {
    let mut cursor = ByteCursor::new(data);

    let picture_type = PictureType::from(cursor.read_u32::<BigEndian>()?);
    let mime_type = cursor.read_length_prefixed_string::<BigEndian>()?;
    let description = cursor.read_length_prefixed_string::<BigEndian>()?;
    let width = cursor.read_u32::<BigEndian>()?;
    let height = cursor.read_u32::<BigEndian>()?;
    let color_depth = cursor.read_u32::<BigEndian>()?;
    let color_count = cursor.read_u32::<BigEndian>()?;
    let data = cursor.read_length_prefixed_block::<BigEndian>()?.to_vec();

    log::debug!(
        "Picture: {:?} {} {}x{}, {} bytes",
        picture_type,
        mime_type,
        width,
        height,
        data.len()
    );

    Ok(PictureBlock {
        picture_type,
        mime_type,
        description,
        width,
        height,
        color_depth,
        color_count,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header(is_last: bool, block_type: u8, length: u32) -> [u8; 4] {
        let raw = (u32::from(is_last) << 31) | (u32::from(block_type) << 24) | length;
        raw.to_be_bytes()
    }

    fn comment_body(entries: &[&str]) -> Vec<u8> {
        let mut out = 0u32.to_le_bytes().to_vec();
        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for entry in entries {
            out.extend_from_slice(&(entry.len() as u32).to_le_bytes());
            out.extend_from_slice(entry.as_bytes());
        }
        out
    }

    fn picture_body(picture_type: u32, mime: &str, data: &[u8], declared_len: u32) -> Vec<u8> {
        let mut out = picture_type.to_be_bytes().to_vec();
        out.extend_from_slice(&(mime.len() as u32).to_be_bytes());
        out.extend_from_slice(mime.as_bytes());
        out.extend_from_slice(&4u32.to_be_bytes());
        out.extend_from_slice(b"desc");
        for value in [16u32, 9, 24, 0] {
            out.extend_from_slice(&value.to_be_bytes());
        }
        out.extend_from_slice(&declared_len.to_be_bytes());
        out.extend_from_slice(data);
        out
    }

    fn stream(blocks: &[(bool, u8, Vec<u8>)]) -> Cursor<Vec<u8>> {
        let mut out = FLAC_MAGIC.to_vec();
        for (is_last, block_type, body) in blocks {
            out.extend_from_slice(&header(*is_last, *block_type, body.len() as u32));
            out.extend_from_slice(body);
        }
        Cursor::new(out)
    }

    #[test]
    fn test_header_bits() {
        let h = BlockHeader::from_u32(u32::from_be_bytes(header(true, 6, 0x01_02_03)));
        assert!(h.is_last);
        assert_eq!(h.block_type, 6);
        assert_eq!(h.length, 0x01_02_03);
    }

    #[test]
    fn test_comments_and_picture() -> Result<()> {
        let mut reader = stream(&[
            (false, BLOCK_STREAMINFO, vec![0; 34]),
            (false, BLOCK_VORBIS_COMMENT, comment_body(&["TITLE=Song", "GENRE=A", "GENRE=B"])),
            (false, BLOCK_PADDING, vec![0; 16]),
            (true, BLOCK_PICTURE, picture_body(3, "image/png", b"PNGDATA", 7)),
        ]);

        let tags = parse(&mut reader, 0, &ExtractorConfig::default())?;
        assert_eq!(tags.properties.get("TITLE").unwrap(), ["Song"]);
        assert_eq!(tags.properties.get("GENRE").unwrap(), ["A", "B"]);
        assert_eq!(tags.pictures.len(), 1);

        let picture = &tags.pictures[0];
        assert_eq!(picture.picture_type, PictureType::CoverFront);
        assert_eq!(picture.mime_type, "image/png");
        assert_eq!(picture.description, "desc");
        assert_eq!((picture.width, picture.height, picture.color_depth), (16, 9, 24));
        assert_eq!(picture.data, b"PNGDATA");
        Ok(())
    }

    #[test]
    fn test_bad_magic() {
        let mut reader = Cursor::new(b"OggS\0\0\0\0".to_vec());
        assert!(matches!(
            parse(&mut reader, 0, &ExtractorConfig::default()),
            Err(Error::InvalidSignature)
        ));
    }

    #[test]
    fn test_picture_data_length_past_block_is_truncated() {
        let mut reader = stream(&[
            (false, BLOCK_VORBIS_COMMENT, comment_body(&["TITLE=Song"])),
            (true, BLOCK_PICTURE, picture_body(3, "image/jpeg", b"abc", 1000)),
        ]);

        assert!(matches!(
            parse(&mut reader, 0, &ExtractorConfig::default()),
            Err(Error::TruncatedData { .. })
        ));
    }

    #[test]
    fn test_block_length_past_end_of_stream() {
        let mut bytes = FLAC_MAGIC.to_vec();
        bytes.extend_from_slice(&header(true, BLOCK_VORBIS_COMMENT, 500));
        bytes.extend_from_slice(&[0; 10]);

        assert!(matches!(
            parse(&mut Cursor::new(bytes), 0, &ExtractorConfig::default()),
            Err(Error::TruncatedData { needed: 500, available: 10 })
        ));
    }

    #[test]
    fn test_missing_block_header_after_non_last_block() {
        let mut reader = stream(&[(false, BLOCK_VORBIS_COMMENT, comment_body(&["TITLE=Song"]))]);

        assert!(matches!(
            parse(&mut reader, 0, &ExtractorConfig::default()),
            Err(Error::TruncatedData { needed: 4, available: 0 })
        ));
    }

    #[test]
    fn test_partial_block_header() {
        let mut bytes = FLAC_MAGIC.to_vec();
        bytes.extend_from_slice(&[0x84, 0x00]);

        assert!(matches!(
            parse(&mut Cursor::new(bytes), 0, &ExtractorConfig::default()),
            Err(Error::TruncatedData { needed: 4, available: 2 })
        ));
    }

    #[test]
    fn test_pictures_skipped_when_artwork_disabled() -> Result<()> {
        let mut reader = stream(&[
            (false, BLOCK_PICTURE, picture_body(3, "image/jpeg", b"abc", 1000)),
            (true, BLOCK_VORBIS_COMMENT, comment_body(&["TITLE=Song"])),
        ]);
        let config = ExtractorConfig {
            include_artwork: false,
            ..ExtractorConfig::default()
        };

        let tags = parse(&mut reader, 0, &config)?;
        assert!(tags.pictures.is_empty());
        assert!(tags.properties.contains("TITLE"));
        Ok(())
    }

    #[test]
    fn test_block_limit_stops_loop() -> Result<()> {
        let padding: Vec<_> = (0..10).map(|_| (false, BLOCK_PADDING, vec![0u8; 2])).collect();
        let mut reader = stream(&padding);
        let config = ExtractorConfig {
            max_metadata_blocks: 4,
            ..ExtractorConfig::default()
        };

        let tags = parse(&mut reader, 0, &config)?;
        assert!(tags.is_empty());
        Ok(())
    }
}
