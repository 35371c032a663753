//! Vorbis comment bodies, shared by FLAC VORBIS_COMMENT blocks and Ogg
//! comment packets.

use byteorder::LittleEndian;

use crate::cursor::ByteCursor;
use crate::tags::RawProperties;
use crate::Result;

/// Parses a Vorbis comment body into `properties` and returns the vendor string.
///
/// Entries without `=` or with an empty key are dropped. A length prefix
/// that runs past the body is a truncation error.
pub fn parse_comments(data: &[u8], properties: &mut RawProperties) -> Result<String> {
    let mut cursor = ByteCursor::new(data);

    let vendor = cursor.read_length_prefixed_string::<LittleEndian>()?;
    let count = cursor.read_u32::<LittleEndian>()?;
    log::debug!("Vorbis comment: vendor {:?}, {} entries", vendor, count);

    for index in 0..count {
        let entry = cursor.read_length_prefixed_block::<LittleEndian>()?;
        let entry = String::from_utf8_lossy(entry);

        match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => properties.insert(key, value),
            _ => log::warn!("Dropping malformed comment entry {}: {:?}", index, entry),
        }
    }

    Ok(vendor)
}
