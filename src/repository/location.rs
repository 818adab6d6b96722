// src/repository/location.rs

//! Repository base URL and relative location resolution

use crate::error::{Error, Result};
use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

/// Relative location of the repository metadata index
pub const REPOMD_LOCATION: &str = "repodata/repomd.xml";

/// Root URL of a Yum repository
///
/// The path always ends with `/` so relative references resolve beneath
/// the repository rather than beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryBase {
    url: Url,
}

impl RepositoryBase {
    /// Parse and normalise a repository URL
    pub fn parse(input: &str) -> Result<Self> {
        let mut url = Url::parse(input.trim())
            .map_err(|e| Error::InvalidInput(format!("invalid repo URL '{input}': {e}")))?;

        if url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!(
                "invalid repo URL '{input}': not a hierarchical URL"
            )));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { url })
    }

    /// The normalised base URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolve a relative reference against this base
    ///
    /// Standard relative-reference resolution: an absolute `href` replaces
    /// the base entirely, a rooted one keeps only scheme and host.
    pub fn resolve(&self, relative: &str) -> Result<Url> {
        self.url.join(relative).map_err(|e| Error::InvalidReference {
            reference: relative.to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for RepositoryBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Derive the local file name for a resolved download location
///
/// Uses the final non-empty path segment, percent-decoded. Names that
/// would escape the destination directory are rejected.
pub fn file_name(location: &Url) -> Result<String> {
    let segment = location
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .ok_or_else(|| {
            Error::MalformedMetadata(format!("no file name in package location {location}"))
        })?;

    let name = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|e| {
            Error::MalformedMetadata(format!("invalid file name in package location {location}: {e}"))
        })?
        .into_owned();

    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(Error::MalformedMetadata(format!(
            "unsafe file name '{name}' in package location {location}"
        )));
    }

    Ok(name)
}
