// src/repository/mod.rs

//! Yum repository access
//!
//! This module provides functionality for:
//! - Resolving metadata and package locations against the repository base
//! - Fetching and decompressing repomd.xml and the primary catalog
//! - Retrieving raw package payloads

pub mod client;
pub mod download;
pub mod location;
pub mod parsers;

pub use client::{Fetch, HttpFetcher};
pub use download::{DownloadOptions, SavedPackage};
pub use location::RepositoryBase;
pub use parsers::{Checksum, PackageCatalog, PackageRecord, PackageVersion, RepoData, RepoMd};

use crate::compression::{create_decoder, CompressionFormat};
use crate::error::{Error, Result};
use std::io::{BufReader, Read};
use tracing::debug;
use url::Url;

/// A package payload ready to be persisted
pub struct Retrieval {
    /// Last path segment of `url`
    pub filename: String,
    pub url: Url,
    /// Raw package bytes, never decompressed
    pub stream: Box<dyn Read>,
}

/// A remote Yum repository
pub struct YumRepository<F> {
    base: RepositoryBase,
    fetcher: F,
}

impl<F: Fetch> YumRepository<F> {
    pub fn new(base: RepositoryBase, fetcher: F) -> Self {
        Self { base, fetcher }
    }

    pub fn base(&self) -> &RepositoryBase {
        &self.base
    }

    /// Download and parse `repodata/repomd.xml`
    pub fn fetch_repomd(&self) -> Result<RepoMd> {
        let url = self.base.resolve(location::REPOMD_LOCATION)?;
        debug!("downloading repo metadata from {}", url);

        let body = self.fetcher.fetch(&url)?;
        let repomd = RepoMd::parse(BufReader::new(body))?;

        if let Some(primary) = repomd.find_primary() {
            debug!(
                "primary metadata at {} ({} {}, timestamp {:?})",
                primary.location,
                primary.checksum.checksum_type,
                primary.checksum.value,
                primary.timestamp
            );
        }
        Ok(repomd)
    }

    /// Download, decompress and parse the primary catalog at `href`
    pub fn fetch_primary(&self, href: &str) -> Result<PackageCatalog> {
        let url = self.base.resolve(href)?;
        debug!("downloading primary metadata from {}", url);

        let body = self.fetcher.fetch(&url)?;
        let format = CompressionFormat::from_location(&url);
        if format != CompressionFormat::None {
            debug!("using {} to decompress primary metadata", format);
        }

        let decoder = create_decoder(body, format)?;
        PackageCatalog::parse(BufReader::new(decoder))
    }

    /// Absolute download URL and local file name for a record
    pub fn package_location(&self, record: &PackageRecord) -> Result<(Url, String)> {
        if record.location.is_empty() {
            return Err(Error::MalformedMetadata(format!(
                "package {} has no location",
                record.nvr()
            )));
        }

        let url = self.base.resolve(&record.location)?;
        let filename = location::file_name(&url)?;
        Ok((url, filename))
    }

    /// Start fetching a package payload
    pub fn retrieve(&self, record: &PackageRecord) -> Result<Retrieval> {
        let (url, filename) = self.package_location(record)?;
        debug!("downloading package from {}", url);

        let stream = self.fetcher.fetch(&url)?;
        Ok(Retrieval {
            filename,
            url,
            stream,
        })
    }
}
