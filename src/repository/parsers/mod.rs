// src/repository/parsers/mod.rs

//! Yum repository metadata parsers
//!
//! This module provides parsers for the two XML documents a Yum client needs:
//! - repomd.xml: the index of metadata files, see [`repomd`]
//! - primary.xml: the package catalog, see [`primary`]
//!
//! Both parsers are streaming and namespace-agnostic: elements are matched
//! on their local name, and only direct children of a `<data>` or
//! `<package>` element populate fields.

pub mod primary;
pub mod repomd;

pub use primary::{PackageCatalog, PackageRecord, PackageVersion};
pub use repomd::{RepoData, RepoMd};

use crate::error::{Error, Result};
use quick_xml::events::BytesStart;
use quick_xml::Reader;

/// Checksum as published in metadata (type plus hex digest)
///
/// Carried for display and future verification; never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checksum {
    /// Algorithm name as written (sha256, sha1, ...)
    pub checksum_type: String,
    /// Digest text
    pub value: String,
}

/// Read an attribute by name, unescaped
fn attr<R>(reader: &Reader<R>, element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    let attribute = element
        .try_get_attribute(name)
        .map_err(|e| malformed(reader, e))?;

    match attribute {
        Some(attr) => {
            let value = attr.unescape_value().map_err(|e| malformed(reader, e))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// Wrap a decode failure with the byte offset it happened at
fn malformed<R>(reader: &Reader<R>, err: impl std::fmt::Display) -> Error {
    Error::MalformedMetadata(format!(
        "XML error at position {}: {}",
        reader.buffer_position(),
        err
    ))
}
