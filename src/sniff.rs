//! Container classification from leading bytes, with an extension hint as a
//! last resort.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::parsers::id3v2;
use crate::Result;

/// Length of the prefix inspected for signatures.
pub const SNIFF_LEN: u64 = 12;

/// The container families the engine knows how to read tags from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Flac,
    Ogg,
    Mpeg,
    Wav,
}

/// The outcome of a successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub kind: ContainerKind,
    /// Offset where the container proper begins. Non-zero when a FLAC stream
    /// is preceded by an ID3v2 tag.
    pub start: u64,
}

/// Classifies a byte source. Returns `Ok(None)` when neither the signature nor
/// the extension hint identifies the container.
///
/// Only a bounded prefix is read (plus one more prefix after a leading ID3v2
/// tag), so the cost does not depend on file size.
pub fn classify<R: Read + Seek>(reader: &mut R, hint: Option<&Path>) -> Result<Option<Sniffed>> {
    reader.seek(SeekFrom::Start(0))?;
    let prefix = read_up_to(reader, SNIFF_LEN)?;

    if let Some(sniffed) = match_signature(reader, &prefix)? {
        log::debug!("Classified as {:?} by signature", sniffed.kind);
        return Ok(Some(sniffed));
    }

    let by_extension = hint.and_then(kind_from_extension);
    match by_extension {
        Some(kind) => {
            log::debug!("Signature inconclusive, classified as {:?} by extension", kind);
            Ok(Some(Sniffed { kind, start: 0 }))
        }
        None => Ok(None),
    }
}

fn match_signature<R: Read + Seek>(reader: &mut R, prefix: &[u8]) -> Result<Option<Sniffed>> {
    if prefix.starts_with(b"fLaC") {
        return Ok(Some(Sniffed {
            kind: ContainerKind::Flac,
            start: 0,
        }));
    }

    if prefix.starts_with(b"OggS") {
        return Ok(Some(Sniffed {
            kind: ContainerKind::Ogg,
            start: 0,
        }));
    }

    if prefix.len() >= 12 && &prefix[0..4] == b"RIFF" && &prefix[8..12] == b"WAVE" {
        return Ok(Some(Sniffed {
            kind: ContainerKind::Wav,
            start: 0,
        }));
    }

    if prefix.len() >= 10 && prefix.starts_with(b"ID3") {
        let header: [u8; 10] = prefix[..10].try_into().unwrap_or([0; 10]);
        let tag_len = id3v2::total_tag_len(&header);

        reader.seek(SeekFrom::Start(tag_len))?;
        let after = read_up_to(reader, 4)?;
        if after.starts_with(b"fLaC") {
            return Ok(Some(Sniffed {
                kind: ContainerKind::Flac,
                start: tag_len,
            }));
        }
        return Ok(Some(Sniffed {
            kind: ContainerKind::Mpeg,
            start: 0,
        }));
    }

    if is_mpeg_frame_sync(prefix) {
        return Ok(Some(Sniffed {
            kind: ContainerKind::Mpeg,
            start: 0,
        }));
    }

    Ok(None)
}

/// 11 set sync bits followed by a non-reserved layer.
fn is_mpeg_frame_sync(prefix: &[u8]) -> bool {
    prefix.len() >= 2 && prefix[0] == 0xFF && prefix[1] & 0xE0 == 0xE0 && prefix[1] & 0x06 != 0
}

fn kind_from_extension(path: &Path) -> Option<ContainerKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "flac" => Some(ContainerKind::Flac),
        "ogg" | "oga" | "opus" => Some(ContainerKind::Ogg),
        "mp3" | "mp2" | "mpga" => Some(ContainerKind::Mpeg),
        "wav" | "wave" => Some(ContainerKind::Wav),
        _ => None,
    }
}

pub(crate) fn read_up_to<R: Read>(reader: &mut R, n: u64) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(n as usize);
    reader.take(n).read_to_end(&mut buf)?;
    Ok(buf)
}
