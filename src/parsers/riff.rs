//! RIFF/WAVE tag chunks: `LIST`/`INFO` text and embedded `id3 ` chunks.

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::LittleEndian;

use crate::cursor::ByteCursor;
use crate::extractor::ExtractorConfig;
use crate::parsers::{id3v2, latin1, read_body};
use crate::sniff::read_up_to;
use crate::tags::{ParsedTags, RawProperties};
use crate::Error;
use crate::Result;

const RIFF_HEADER_LEN: u64 = 12;
const CHUNK_HEADER_LEN: u64 = 8;

/// INFO sub-chunk id to property key.
const INFO_FIELDS: &[(&[u8; 4], &str)] = &[
    (b"INAM", "TITLE"),
    (b"IART", "ARTIST"),
    (b"IPRD", "ALBUM"),
    (b"IGNR", "GENRE"),
    (b"ICRD", "DATE"),
    (b"ITRK", "TRACKNUMBER"),
    (b"IPRT", "TRACKNUMBER"),
    (b"ICMT", "COMMENT"),
];

/// Walks the top-level chunks of a WAVE file.
///
/// A non-tag chunk that runs past the end of the file ends the walk (common
/// for streamed recordings with a placeholder data size); a truncated tag
/// chunk is an error.
pub fn parse<R: Read + Seek>(reader: &mut R, config: &ExtractorConfig) -> Result<ParsedTags> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let header = read_up_to(reader, RIFF_HEADER_LEN)?;
    if header.len() < RIFF_HEADER_LEN as usize
        || &header[0..4] != b"RIFF"
        || &header[8..12] != b"WAVE"
    {
        return Err(Error::InvalidSignature);
    }

    let mut tags = ParsedTags::default();
    let mut pos = RIFF_HEADER_LEN;

    while pos + CHUNK_HEADER_LEN <= file_len {
        reader.seek(SeekFrom::Start(pos))?;
        let raw = read_body(reader, CHUNK_HEADER_LEN)?;
        let mut chunk = ByteCursor::new(&raw);
        let id: [u8; 4] = chunk.take(4)?.try_into().unwrap_or_default();
        let size = u64::from(chunk.read_u32::<LittleEndian>()?);

        let data_start = pos + CHUNK_HEADER_LEN;
        let available = file_len - data_start;
        let is_tag_chunk = matches!(&id, b"LIST" | b"id3 " | b"ID3 ");

        if size > available {
            if is_tag_chunk {
                return Err(Error::truncated(size, available));
            }
            log::warn!(
                "Chunk {:?} claims {} bytes, {} left; stopping",
                String::from_utf8_lossy(&id),
                size,
                available
            );
            break;
        }

        log::debug!("RIFF chunk {:?}, {} bytes", String::from_utf8_lossy(&id), size);

        match &id {
            b"LIST" if size >= 4 => {
                let list_type = read_body(reader, 4)?;
                if list_type != b"INFO" {
                    log::debug!("Skipping {:?} list", String::from_utf8_lossy(&list_type));
                } else {
                    let body_len = size - 4;
                    if body_len > u64::from(config.max_tag_size) {
                        return Err(Error::truncated(body_len, config.max_tag_size.into()));
                    }
                    let body = read_body(reader, body_len)?;
                    parse_info(&body, &mut tags.properties)?;
                }
            }
            b"id3 " | b"ID3 " => {
                if size > u64::from(config.max_tag_size) {
                    return Err(Error::truncated(size, config.max_tag_size.into()));
                }
                // The tag may not claim bytes beyond its own chunk.
                let body = read_body(reader, size)?;
                let embedded = id3v2::parse(&mut Cursor::new(body), 0, config)?;
                tags.properties.merge(embedded.properties);
                tags.pictures.extend(embedded.pictures);
            }
            _ => {}
        }

        // Chunks are word-aligned.
        pos = data_start + size + (size & 1);
    }

    Ok(tags)
}

fn parse_info(data: &[u8], properties: &mut RawProperties) -> Result<()> {
    let mut cursor = ByteCursor::new(data);

    while cursor.remaining() >= CHUNK_HEADER_LEN as usize {
        let id = cursor.take(4)?;
        let value = cursor.read_length_prefixed_block::<LittleEndian>()?;
        if value.len() % 2 == 1 && !cursor.is_empty() {
            cursor.skip(1)?;
        }

        let Some(&(_, key)) = INFO_FIELDS.iter().find(|(field, _)| &field[..] == id) else {
            continue;
        };
        let end = value.iter().position(|&b| b == 0).unwrap_or(value.len());
        properties.insert(key, latin1(&value[..end]).trim_end());
    }
    Ok(())
}
