//! Core functionality for extracting tag metadata from audio files.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::metadata::{Artwork, Metadata};
use crate::normalize::normalize;
use crate::parsers::{flac, id3v1, id3v2, ogg, riff};
use crate::sniff::{classify, ContainerKind};
use crate::tags::ParsedTags;
use crate::Error;
use crate::Result;

/// Configuration options for the extraction process.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Whether to read embedded pictures into the record's artwork
    pub include_artwork: bool,

    /// Maximum number of FLAC metadata blocks read before giving up on
    /// finding the last-block flag
    pub max_metadata_blocks: usize,

    /// Maximum number of Ogg pages read while looking for the comment header
    pub max_ogg_pages: usize,

    /// Maximum size (in bytes) of any single buffered tag structure
    pub max_tag_size: u32,

    /// Separator used when a multi-valued property fills a text field
    pub value_separator: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            include_artwork: true,
            max_metadata_blocks: 128,
            max_ogg_pages: 512,
            max_tag_size: 16 * 1024 * 1024,
            value_separator: " ".to_string(),
        }
    }
}

/// The main extractor struct responsible for reading tags from audio files.
///
/// An extractor holds only its configuration, so one instance can serve any
/// number of concurrent extractions.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    /// Creates a new extractor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with the given configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// The configuration this extractor was built with.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Opens `path` and extracts its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened ([`Error::Open`])
    /// - The container is not recognized ([`Error::InvalidSignature`])
    /// - A declared length runs past the available data ([`Error::TruncatedData`])
    /// - The file carries no usable tags ([`Error::NoTagData`])
    pub fn extract_path<P: AsRef<Path>>(&self, path: P) -> Result<Metadata> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.extract_from_reader(BufReader::new(file), Some(path))
    }

    /// Extracts metadata from any seekable byte source.
    ///
    /// # Arguments
    ///
    /// * `reader` - The audio data, positioned anywhere
    /// * `hint` - Optional file name, used for classification only when the
    ///   leading bytes are inconclusive
    pub fn extract_from_reader<R: Read + Seek>(
        &self,
        mut reader: R,
        hint: Option<&Path>,
    ) -> Result<Metadata> {
        log::info!(
            "Starting tag extraction{}",
            hint.map(|p| format!(" from {}", p.display()))
                .unwrap_or_default()
        );

        let sniffed = classify(&mut reader, hint)?.ok_or(Error::InvalidSignature)?;
        let tags = self.parse_tags(&mut reader, sniffed.kind, sniffed.start)?;

        for (key, values) in tags.properties.iter() {
            log::debug!("{} = {:?}", key, values);
        }

        if tags.is_empty() {
            log::info!("No tag data in {:?} container", sniffed.kind);
            return Err(Error::NoTagData);
        }

        let mut metadata = normalize(
            &tags.properties,
            tags.fallback.as_ref(),
            &self.config.value_separator,
        );
        if self.config.include_artwork {
            metadata.artwork = Artwork::select(tags.pictures);
        }

        log::info!(
            "Extracted {:?} metadata: {} properties, artwork {}",
            sniffed.kind,
            tags.properties.len(),
            metadata
                .artwork
                .as_ref()
                .map(|a| format!("{} bytes", a.len()))
                .unwrap_or_else(|| "absent".to_string())
        );

        Ok(metadata)
    }

    /// Runs the parser matching `kind`.
    fn parse_tags<R: Read + Seek>(
        &self,
        reader: &mut R,
        kind: ContainerKind,
        start: u64,
    ) -> Result<ParsedTags> {
        let mut tags = match kind {
            ContainerKind::Flac => flac::parse(reader, start, &self.config)?,
            ContainerKind::Ogg => ogg::parse(reader, &self.config)?,
            ContainerKind::Mpeg => id3v2::parse(reader, 0, &self.config)?,
            ContainerKind::Wav => riff::parse(reader, &self.config)?,
        };

        // Ogg pages leave no room for a trailer; every other kind may carry one.
        if kind != ContainerKind::Ogg {
            tags.fallback = id3v1::parse(reader)?;
        }

        Ok(tags)
    }
}
