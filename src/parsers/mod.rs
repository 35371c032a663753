//! One tag parser per container kind.
//!
//! Each parser produces a [`ParsedTags`](crate::tags::ParsedTags). Structural
//! violations abort with an error; malformed individual entries are logged and
//! dropped.

pub mod flac;
pub mod id3v1;
pub mod id3v2;
pub mod ogg;
pub mod riff;
pub mod vorbis;

use std::io::Read;

use crate::Error;
use crate::Result;

/// Reads exactly `len` bytes, reporting a short read as truncation.
pub(crate) fn read_body<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(Error::truncated(len, buf.len() as u64));
    }
    Ok(buf)
}

/// Decodes ISO-8859-1, where every byte is its own code point.
pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
