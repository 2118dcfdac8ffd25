mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use reqwest::Method;
use reqwest::blocking::Request;
use tracing::debug;

use crate::error::{Error, Result};

/// Performs one GET against `url` and returns the response body.
///
/// A non-success status is reported as [`Error::Transport`]; there is no
/// retry.
#[tracing::instrument(skip(client))]
pub fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Bytes> {
    let parsed = reqwest::Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = Request::new(Method::GET, parsed);

    let resp = client.execute(req)?.error_for_status()?;
    let bytes = resp.bytes()?;
    debug!(bytes = bytes.len(), "Feed bytes received");
    Ok(bytes)
}

/// Where a feed snapshot comes from: the live endpoint or a captured file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl FeedSource {
    /// `http://` and `https://` sources are URLs, anything else is a path.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            FeedSource::Url(source.to_string())
        } else {
            FeedSource::File(PathBuf::from(source))
        }
    }

    pub fn load<C: HttpClient + ?Sized>(&self, client: &C) -> Result<Bytes> {
        match self {
            FeedSource::Url(url) => fetch_bytes(client, url),
            FeedSource::File(path) => Ok(Bytes::from(std::fs::read(path)?)),
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Url(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}
