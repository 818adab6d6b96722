// src/compression.rs

//! Decompression of repository metadata
//!
//! The primary catalog may be published as plain XML, `.gz` or `.bz2`.
//! The format is chosen from the trailing extension of the resolved
//! location only; content is not sniffed.

use crate::error::{Error, Result};
use std::fmt;
use std::io::{self, Cursor, Read};
use url::Url;

/// Gzip magic: `1f 8b`
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Bzip2 magic: "BZh"
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Supported compression formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// No compression (raw data)
    None,
    /// Gzip compression (.gz)
    Gzip,
    /// Bzip2 compression (.bz2)
    Bzip2,
}

impl CompressionFormat {
    /// Detect compression format from a path's extension
    ///
    /// # Examples
    /// ```
    /// use yum_get::compression::CompressionFormat;
    ///
    /// assert_eq!(CompressionFormat::from_extension("primary.xml.gz"), CompressionFormat::Gzip);
    /// assert_eq!(CompressionFormat::from_extension("primary.xml.bz2"), CompressionFormat::Bzip2);
    /// assert_eq!(CompressionFormat::from_extension("primary.xml.zst"), CompressionFormat::None);
    /// ```
    pub fn from_extension(path: &str) -> Self {
        if path.ends_with(".gz") {
            Self::Gzip
        } else if path.ends_with(".bz2") {
            Self::Bzip2
        } else {
            Self::None
        }
    }

    /// Detect compression format from a resolved location
    ///
    /// Only the URL path is inspected, so query strings and fragments
    /// (e.g. mirror tokens) do not affect selection.
    pub fn from_location(location: &Url) -> Self {
        Self::from_extension(location.path())
    }

    fn magic(&self) -> &'static [u8] {
        match self {
            Self::None => &[],
            Self::Gzip => GZIP_MAGIC,
            Self::Bzip2 => BZIP2_MAGIC,
        }
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        }
    }
}

impl fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Create a decompressing reader for the given format
///
/// For `CompressionFormat::None` the reader is returned unchanged. For the
/// compressed formats the stream header is read and checked up front, so a
/// stream that cannot start decoding fails here with
/// [`Error::UnsupportedEncoding`] rather than later inside the XML parser.
pub fn create_decoder<'a, R: Read + 'a>(
    reader: R,
    format: CompressionFormat,
) -> Result<Box<dyn Read + 'a>> {
    match format {
        CompressionFormat::None => Ok(Box::new(reader)),
        CompressionFormat::Gzip => {
            let reader = check_header(reader, format)?;
            Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
        }
        CompressionFormat::Bzip2 => {
            let reader = check_header(reader, format)?;
            Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
        }
    }
}

/// Read the magic bytes and hand back a reader that replays them
fn check_header<R: Read>(mut reader: R, format: CompressionFormat) -> Result<impl Read> {
    let magic = format.magic();
    let mut header = vec![0u8; magic.len()];

    reader.read_exact(&mut header).map_err(|e| {
        let reason = if e.kind() == io::ErrorKind::UnexpectedEof {
            "stream too short for header".to_string()
        } else {
            format!("failed to read header: {e}")
        };
        Error::UnsupportedEncoding {
            format: format.name(),
            reason,
        }
    })?;

    if header != magic {
        return Err(Error::UnsupportedEncoding {
            format: format.name(),
            reason: format!("invalid header {header:02x?}"),
        });
    }

    Ok(Cursor::new(header).chain(reader))
}
