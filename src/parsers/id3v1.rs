//! ID3v1 trailer, the least-common-denominator fallback tag.
//!
//! The last 128 bytes of the file:
//!
//! | offset | len | field |
//! |--------|-----|-------|
//! | 0      | 3   | `TAG` |
//! | 3      | 30  | title |
//! | 33     | 30  | artist |
//! | 63     | 30  | album |
//! | 93     | 4   | year |
//! | 97     | 30  | comment (ID3v1.1: byte 28 zero, byte 29 track) |
//! | 127    | 1   | genre index |

use std::io::{Read, Seek, SeekFrom};

use crate::parsers::{latin1, read_body};
use crate::tags::FallbackTag;
use crate::Result;

pub const TAG_LEN: u64 = 128;

/// The standard ID3v1 genres plus the Winamp extensions.
pub const GENRES: &[&str] = &[
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge", "Hip-Hop",
    "Jazz", "Metal", "New Age", "Oldies", "Other", "Pop", "R&B", "Rap", "Reggae", "Rock",
    "Techno", "Industrial", "Alternative", "Ska", "Death Metal", "Pranks", "Soundtrack",
    "Euro-Techno", "Ambient", "Trip-Hop", "Vocal", "Jazz+Funk", "Fusion", "Trance",
    "Classical", "Instrumental", "Acid", "House", "Game", "Sound Clip", "Gospel", "Noise",
    "Alternative Rock", "Bass", "Soul", "Punk", "Space", "Meditative", "Instrumental Pop",
    "Instrumental Rock", "Ethnic", "Gothic", "Darkwave", "Techno-Industrial", "Electronic",
    "Pop-Folk", "Eurodance", "Dream", "Southern Rock", "Comedy", "Cult", "Gangsta",
    "Top 40", "Christian Rap", "Pop/Funk", "Jungle", "Native American", "Cabaret",
    "New Wave", "Psychedelic", "Rave", "Showtunes", "Trailer", "Lo-Fi", "Tribal",
    "Acid Punk", "Acid Jazz", "Polka", "Retro", "Musical", "Rock & Roll", "Hard Rock",
    "Folk", "Folk-Rock", "National Folk", "Swing", "Fast Fusion", "Bebop", "Latin",
    "Revival", "Celtic", "Bluegrass", "Avantgarde", "Gothic Rock", "Progressive Rock",
    "Psychedelic Rock", "Symphonic Rock", "Slow Rock", "Big Band", "Chorus",
    "Easy Listening", "Acoustic", "Humour", "Speech", "Chanson", "Opera", "Chamber Music",
    "Sonata", "Symphony", "Booty Bass", "Primus", "Porn Groove", "Satire", "Slow Jam",
    "Club", "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul",
    "Freestyle", "Duet", "Punk Rock", "Drum Solo", "A Cappella", "Euro-House",
    "Dance Hall", "Goa", "Drum & Bass", "Club-House", "Hardcore", "Terror", "Indie",
    "BritPop", "Negerpunk", "Polsk Punk", "Beat", "Christian Gangsta Rap", "Heavy Metal",
    "Black Metal", "Crossover", "Contemporary Christian", "Christian Rock", "Merengue",
    "Salsa", "Thrash Metal", "Anime", "JPop", "Synthpop",
];

pub fn genre_name(index: u8) -> Option<&'static str> {
    GENRES.get(usize::from(index)).copied()
}

/// Reads the trailer if present. A file without one yields `Ok(None)`.
pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Option<FallbackTag>> {
    let len = reader.seek(SeekFrom::End(0))?;
    if len < TAG_LEN {
        return Ok(None);
    }
    reader.seek(SeekFrom::Start(len - TAG_LEN))?;
    let raw = read_body(reader, TAG_LEN)?;
    Ok(parse_trailer(&raw))
}

fn parse_trailer(raw: &[u8]) -> Option<FallbackTag> {
    if raw.len() < TAG_LEN as usize || !raw.starts_with(b"TAG") {
        return None;
    }

    let track = if raw[125] == 0 && raw[126] != 0 {
        Some(u32::from(raw[126]))
    } else {
        None
    };

    let year = text_field(&raw[93..97])
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&y| y != 0);

    let tag = FallbackTag {
        title: text_field(&raw[3..33]),
        artist: text_field(&raw[33..63]),
        album: text_field(&raw[63..93]),
        genre: genre_name(raw[127]).map(str::to_owned),
        year,
        track,
    };
    log::debug!("ID3v1 trailer: {:?}", tag);
    Some(tag)
}

/// NUL-padded Latin-1 text. Blank fields are absent.
fn text_field(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let text = latin1(&bytes[..end]);
    let text = text.trim_end();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
