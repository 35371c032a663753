//! Error handling for the audio tag extractor.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while extracting tag metadata.
#[derive(Debug)]
pub enum Error {
    /// The file could not be opened.
    Open {
        path: PathBuf,
        source: io::Error,
    },

    /// The leading bytes don't match any known container.
    InvalidSignature,

    /// A declared length runs past the end of the available data.
    TruncatedData {
        /// Bytes the structure claimed to need.
        needed: u64,
        /// Bytes that were actually left.
        available: u64,
    },

    /// The container was recognized but holds no usable tag fields.
    NoTagData,

    /// An I/O error occurred after the file was opened.
    Io(io::Error),
}

impl Error {
    pub(crate) fn truncated(needed: u64, available: u64) -> Self {
        Error::TruncatedData { needed, available }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Open { path, source } => {
                write!(f, "Failed to open {}: {}", path.display(), source)
            }
            Error::InvalidSignature => write!(f, "Unrecognized container signature"),
            Error::TruncatedData { needed, available } => write!(
                f,
                "Truncated data: needed {} bytes, {} available",
                needed, available
            ),
            Error::NoTagData => write!(f, "No tag data found"),
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Open { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
