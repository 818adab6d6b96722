// src/repository/download.rs

//! Saving package payloads to disk
//!
//! Payloads are streamed into a temporary file next to the destination and
//! renamed into place once complete, so an interrupted download never
//! leaves a partial file under the package's name.

use super::{Fetch, Retrieval, YumRepository};
use crate::error::{Error, Result};
use crate::repository::PackageRecord;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Where and how to write downloaded packages
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory the package file is written into
    pub dest_dir: PathBuf,
    /// Replace an existing file of the same name
    pub overwrite: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            dest_dir: PathBuf::from("."),
            overwrite: false,
        }
    }
}

/// A package file written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPackage {
    /// File name, the last path segment of the download URL
    pub filename: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Fail early if `filename` would clobber an existing file
pub fn check_destination(dest_dir: &Path, filename: &str, overwrite: bool) -> Result<PathBuf> {
    let path = dest_dir.join(filename);
    if !overwrite && path.symlink_metadata().is_ok() {
        return Err(Error::FileConflict(path.display().to_string()));
    }
    Ok(path)
}

/// Resolve, fetch and save one package
///
/// The destination is checked before any request is made, so a conflict
/// costs no network traffic and leaves the existing file untouched.
pub fn download_package<F: Fetch>(
    repo: &YumRepository<F>,
    record: &PackageRecord,
    options: &DownloadOptions,
) -> Result<SavedPackage> {
    let (url, filename) = repo.package_location(record)?;
    check_destination(&options.dest_dir, &filename, options.overwrite)?;

    info!("Downloading {} from {}", record.nvr(), url);
    let retrieval = repo.retrieve(record)?;
    save(retrieval, options)
}

/// Stream a retrieval into `options.dest_dir`
pub fn save(retrieval: Retrieval, options: &DownloadOptions) -> Result<SavedPackage> {
    let Retrieval {
        filename,
        url,
        mut stream,
    } = retrieval;
    let path = check_destination(&options.dest_dir, &filename, options.overwrite)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".yum-get-")
        .suffix(".part")
        .tempfile_in(&options.dest_dir)
        .map_err(|e| {
            Error::IoError(format!(
                "Failed to create file in {}: {e}",
                options.dest_dir.display()
            ))
        })?;

    let bytes = stream_to_file(&mut stream, temp.as_file_mut(), url.as_str())?;

    let persisted = if options.overwrite {
        temp.persist(&path)
    } else {
        temp.persist_noclobber(&path)
    };
    persisted.map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            Error::FileConflict(path.display().to_string())
        } else {
            Error::IoError(format!("Failed to write {}: {}", path.display(), e.error))
        }
    })?;

    debug!("downloaded {} bytes to {}", bytes, path.display());
    Ok(SavedPackage {
        filename,
        path,
        bytes,
    })
}

/// Copy the body in chunks, keeping read and write failures apart
fn stream_to_file(stream: &mut dyn Read, file: &mut File, url: &str) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(Error::DownloadError(format!(
                    "Failed to read response from {url}: {e}"
                )));
            }
        };

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;
    }

    file.flush()
        .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;
    Ok(downloaded)
}
