// src/repository/client.rs

//! HTTP client for repository operations
//!
//! Every network read goes through the [`Fetch`] trait so the pipeline can
//! run against an in-memory repository in tests.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::io::Read;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw bytes for a resolved location
pub trait Fetch {
    /// Start a GET of `url` and return its body as a stream
    ///
    /// Fails with [`Error::DownloadError`] on transport errors and
    /// [`Error::RemoteStatus`] on any status other than 200 OK.
    fn fetch(&self, url: &Url) -> Result<Box<dyn Read>>;
}

/// Blocking HTTP fetcher, no retries
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Some(HTTP_TIMEOUT))
    }

    /// Create a fetcher; `None` disables the request timeout
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("yum-get/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Box<dyn Read>> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to download {url}: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::RemoteStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            debug!("{} returned {} bytes", url, len);
        }
        Ok(Box::new(response))
    }
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &Url) -> Result<Box<dyn Read>> {
        (**self).fetch(url)
    }
}
