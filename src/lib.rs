//! # Audio Tag Extractor
//!
//! A library for reading tag metadata and embedded artwork from audio files.
//!
//! The container is identified from its leading bytes (FLAC, Ogg, MPEG audio,
//! WAVE), its tag structures are parsed, and differently named fields are
//! normalized into one [`Metadata`] record.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let metadata = audio_tag_extractor::extract("song.flac")?;
//!
//!     println!("{:?} by {:?}", metadata.title, metadata.artist);
//!     if let Some(artwork) = &metadata.artwork {
//!         println!("Cover art: {} ({} bytes)", artwork.mime_type, artwork.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::path::Path;

pub mod cursor;
pub mod error;
pub mod extractor;
pub mod metadata;
pub mod normalize;
pub mod parsers;
pub mod sniff;
pub mod tags;

pub use cursor::ByteCursor;
pub use error::Error;
pub use extractor::{Extractor, ExtractorConfig};
pub use metadata::{Artwork, Metadata};
pub use sniff::ContainerKind;
pub use tags::{PictureBlock, PictureType, RawProperties};

/// Re-export of the Result type specialized for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Extracts metadata from the file at `path` with the default configuration.
pub fn extract<P: AsRef<Path>>(path: P) -> Result<Metadata> {
    Extractor::new().extract_path(path)
}
