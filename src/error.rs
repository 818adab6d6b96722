// src/error.rs

use thiserror::Error;

/// Core error types for yum-get
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed repository URL, bad CLI combination, etc.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A location reference that cannot be resolved against the repository base
    #[error("Invalid reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// Transport-level failure (connect, timeout, broken body)
    #[error("Download error: {0}")]
    DownloadError(String),

    /// The server answered with anything other than 200 OK
    #[error("Unexpected status {status} from {url}")]
    RemoteStatus { status: u16, url: String },

    /// XML decode failure or structurally unusable metadata
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    /// A compressed stream whose header could not be decoded
    #[error("Unsupported {format} stream: {reason}")]
    UnsupportedEncoding {
        format: &'static str,
        reason: String,
    },

    /// repomd.xml lists no usable primary catalog
    #[error("No primary catalog in repository metadata")]
    PrimaryNotFound,

    /// Package request is not of the form name-ver-rel
    #[error("Package not in name-ver-rel format: {0}")]
    InvalidIdentityFormat(String),

    /// No catalog record matches the requested identity
    #[error("Failed to find package in repository: {0}")]
    PackageNotFound(String),

    /// Destination file exists and overwriting was not permitted
    #[error("File already exists: {0}")]
    FileConflict(String),

    /// I/O errors with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// HTTP client construction failed
    #[error("Failed to initialize: {0}")]
    InitError(String),
}

/// Result type alias using yum-get's Error type
pub type Result<T> = std::result::Result<T, Error>;
