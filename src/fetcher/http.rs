//! HTTP fetcher implementation
//!
//! Downloads a URL and writes the body verbatim to `<output_dir>/<basename>`.
//! The blocking fetcher serves the thread pool and the worker process; the
//! async fetcher serves the event loop, where the network send, the body read
//! and the file write are the only suspension points.
//!
//! No request timeout is configured: a hung server blocks its unit of work
//! until the connection is closed.

use crate::config::FetchConfig;
use crate::FetchError;
use reqwest::{blocking, Client};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Builds the blocking client shared by all thread-pool workers
pub fn build_blocking_client(user_agent: &str) -> Result<blocking::Client, reqwest::Error> {
    blocking::Client::builder()
        .user_agent(user_agent)
        // The blocking client defaults to a 30s timeout; units must not be cut short
        .timeout(None::<Duration>)
        .build()
}

/// Builds the async client used by the event loop
pub fn build_async_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(user_agent).build()
}

/// Returns the local file name for a URL: its final path segment
///
/// The query string and fragment are not part of the name. Two URLs with the
/// same basename target the same file, and the last write wins.
///
/// # Example
///
/// ```
/// use batch_fetch::fetcher::file_name_for;
///
/// assert_eq!(file_name_for("https://example.com/img/cat.jpg?size=2").unwrap(), "cat.jpg");
/// assert!(file_name_for("https://example.com/").is_err());
/// ```
pub fn file_name_for(url: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FetchError::NoFileName(url.to_string()))
}

/// Blocking fetch-and-save for a single URL
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: blocking::Client,
    output_dir: PathBuf,
    user_agent: String,
}

impl HttpFetcher {
    /// Creates a fetcher that writes into `output_dir`
    ///
    /// The directory is not created here; it must exist before dispatch.
    pub fn new(output_dir: impl Into<PathBuf>, user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_blocking_client(user_agent)?,
            output_dir: output_dir.into(),
            user_agent: user_agent.to_string(),
        })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.output_dir.clone(), &config.user_agent)
    }

    /// Builds the async counterpart writing into the same directory
    ///
    /// Call this from inside the runtime that will drive the returned fetcher.
    pub fn to_async(&self) -> Result<AsyncFetcher, reqwest::Error> {
        Ok(AsyncFetcher {
            client: build_async_client(&self.user_agent)?,
            output_dir: self.output_dir.clone(),
        })
    }

    /// Fetches `url` and saves the body, returning the written file name
    pub fn fetch_blocking(&self, url: &str) -> Result<String, FetchError> {
        let filename = file_name_for(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| transport_error(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .map_err(|source| transport_error(url, source))?;

        let path = self.output_dir.join(&filename);
        std::fs::write(&path, &body).map_err(|source| FetchError::Write { path, source })?;

        tracing::debug!("Saved {} ({} bytes) from {}", filename, body.len(), url);
        Ok(filename)
    }
}

/// Async fetch-and-save, driven by the event loop
#[derive(Debug, Clone)]
pub struct AsyncFetcher {
    client: Client,
    output_dir: PathBuf,
}

impl AsyncFetcher {
    /// Fetches `url` and saves the body, returning the written file name
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let filename = file_name_for(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| transport_error(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| transport_error(url, source))?;

        let path = self.output_dir.join(&filename);
        if let Err(source) = tokio::fs::write(&path, &body).await {
            return Err(FetchError::Write { path, source });
        }

        tracing::debug!("Saved {} ({} bytes) from {}", filename, body.len(), url);
        Ok(filename)
    }
}

fn transport_error(url: &str, source: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        source,
    }
}
