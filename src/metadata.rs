//! The canonical record handed back to callers.

use crate::tags::{PictureBlock, PictureType};

/// Normalized tag metadata for one audio file.
///
/// Every field is independently optional: `None` means the file did not
/// carry the field, while `Some(String::new())` means it carried an explicitly
/// empty value. The record owns its artwork and keeps no reference to the
/// source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub release_year: Option<u32>,
    pub artwork: Option<Artwork>,
}

impl Metadata {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}

/// An embedded picture selected as the record's artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub mime_type: String,
    pub picture_type: PictureType,
    /// Zero when the container does not record dimensions.
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Artwork {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Picks the front cover if there is one, otherwise the first picture.
    pub fn select(pictures: Vec<PictureBlock>) -> Option<Artwork> {
        let index = pictures
            .iter()
            .position(|p| p.picture_type == PictureType::CoverFront)
            .unwrap_or(0);
        pictures.into_iter().nth(index).map(Artwork::from)
    }
}

impl From<PictureBlock> for Artwork {
    fn from(picture: PictureBlock) -> Self {
        Self {
            mime_type: picture.mime_type,
            picture_type: picture.picture_type,
            width: picture.width,
            height: picture.height,
            data: picture.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture(code: u32, data: &[u8]) -> PictureBlock {
        PictureBlock {
            picture_type: PictureType::from(code),
            mime_type: "image/jpeg".to_string(),
            description: String::new(),
            width: 1,
            height: 1,
            color_depth: 24,
            color_count: 0,
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_front_cover_preferred() {
        let art = Artwork::select(vec![picture(4, b"back"), picture(3, b"front")]).unwrap();
        assert_eq!(art.data, b"front");
        assert_eq!(art.len(), 5);
    }

    #[test]
    fn test_first_picture_without_front_cover() {
        let art = Artwork::select(vec![picture(0, b"one"), picture(8, b"two")]).unwrap();
        assert_eq!(art.data, b"one");
    }

    #[test]
    fn test_no_pictures() {
        assert!(Artwork::select(Vec::new()).is_none());
    }

    #[test]
    fn test_explicit_empty_is_not_absent() {
        let record = Metadata {
            title: Some(String::new()),
            ..Metadata::default()
        };
        assert!(!record.is_empty());
    }
}
