//! Intermediate, format-neutral tag data produced by the parsers.

use std::collections::BTreeMap;

/// Multi-valued property map with upper-case keys.
///
/// Values for a repeated key keep the order in which they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProperties {
    entries: BTreeMap<String, Vec<String>>,
}

impl RawProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` under the upper-cased `key`.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.to_uppercase())
            .or_default()
            .push(value.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(&key.to_uppercase()).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_uppercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.remove(&key.to_uppercase())
    }

    /// Appends every value of `other`, keeping existing values first.
    pub fn merge(&mut self, other: RawProperties) {
        for (key, values) in other.entries {
            self.entries.entry(key).or_default().extend(values);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Picture type codes shared by FLAC PICTURE blocks and ID3v2 APIC frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureType {
    Other,
    FileIcon,
    OtherFileIcon,
    CoverFront,
    CoverBack,
    LeafletPage,
    Media,
    LeadArtist,
    Artist,
    Conductor,
    Band,
    Composer,
    Lyricist,
    RecordingLocation,
    DuringRecording,
    DuringPerformance,
    ScreenCapture,
    BrightColouredFish,
    Illustration,
    BandLogo,
    PublisherLogo,
    Unknown(u32),
}

impl From<u32> for PictureType {
    fn from(code: u32) -> Self {
        match code {
            0 => PictureType::Other,
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::ScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            other => PictureType::Unknown(other),
        }
    }
}

/// An embedded picture as found in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureBlock {
    pub picture_type: PictureType,
    pub mime_type: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
    pub color_count: u32,
    pub data: Vec<u8>,
}

/// Flat, single-valued fields from a least-common-denominator tag (ID3v1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackTag {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<u32>,
    pub track: Option<u32>,
}

impl FallbackTag {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.genre.is_none()
            && self.year.is_none()
            && self.track.is_none()
    }
}

/// Everything a parser found in one file.
#[derive(Debug, Clone, Default)]
pub struct ParsedTags {
    pub properties: RawProperties,
    pub fallback: Option<FallbackTag>,
    pub pictures: Vec<PictureBlock>,
}

impl ParsedTags {
    /// True when no parser found anything a record could be built from.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.fallback.as_ref().map_or(true, FallbackTag::is_empty)
            && self.pictures.is_empty()
    }
}
