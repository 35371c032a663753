//! Maps format-specific property spellings onto the canonical record.
//!
//! Each canonical field resolves through a fixed chain: the property keys in
//! the order listed below, then the flat fallback tag, then absent.

use crate::metadata::Metadata;
use crate::tags::{FallbackTag, RawProperties};

pub const KEYS_TITLE: &[&str] = &["TITLE"];
pub const KEYS_ARTIST: &[&str] = &["ARTIST"];
pub const KEYS_ALBUM: &[&str] = &["ALBUM"];
pub const KEYS_ALBUM_ARTIST: &[&str] = &["ALBUMARTIST", "ALBUM ARTIST", "ALBUM_ARTIST"];
pub const KEYS_GENRE: &[&str] = &["GENRE"];
pub const KEYS_DATE: &[&str] = &["DATE", "YEAR"];
pub const KEYS_TRACK_NUMBER: &[&str] = &["TRACKNUMBER", "TRACK"];
pub const KEYS_DISC_NUMBER: &[&str] = &["DISCNUMBER", "DISC"];

/// Builds a record from raw properties and an optional fallback tag.
///
/// Multi-valued text is joined with `separator`. Integer fields use the first
/// value of the resolved key; an unparsable or zero value leaves the field
/// unset instead of failing.
pub fn normalize(
    properties: &RawProperties,
    fallback: Option<&FallbackTag>,
    separator: &str,
) -> Metadata {
    let text = |keys: &[&str], flat: Option<&String>| {
        find_values(properties, keys)
            .map(|values| values.join(separator))
            .or_else(|| flat.cloned())
    };
    let number = |keys: &[&str], flat: Option<u32>| {
        let parsed = match find_values(properties, keys) {
            Some(values) => values.first().and_then(|v| parse_leading_int(v)),
            None => flat,
        };
        parsed.filter(|&n| n != 0)
    };

    Metadata {
        title: text(KEYS_TITLE, fallback.and_then(|f| f.title.as_ref())),
        artist: text(KEYS_ARTIST, fallback.and_then(|f| f.artist.as_ref())),
        album: text(KEYS_ALBUM, fallback.and_then(|f| f.album.as_ref())),
        album_artist: text(KEYS_ALBUM_ARTIST, None),
        genre: text(KEYS_GENRE, fallback.and_then(|f| f.genre.as_ref())),
        track_number: number(KEYS_TRACK_NUMBER, fallback.and_then(|f| f.track)),
        disc_number: number(KEYS_DISC_NUMBER, None),
        release_year: number(KEYS_DATE, fallback.and_then(|f| f.year)),
        artwork: None,
    }
}

/// Values of the first key in `keys` that is present.
fn find_values<'a>(properties: &'a RawProperties, keys: &[&str]) -> Option<&'a [String]> {
    keys.iter().find_map(|key| properties.get(key))
}

/// Parses a leading decimal integer: `"3/12"` is 3, `"2004-05-01"` is 2004.
/// Returns `None` when there are no digits or the value is negative.
pub fn parse_leading_int(value: &str) -> Option<u32> {
    let trimmed = value.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..end].parse().ok()
}
