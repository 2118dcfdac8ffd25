//! Feed endpoints and credentials.
//!
//! The API key is read once from a local file at startup and handed to the
//! client as part of [`FeedConfig`]; nothing is kept in global state.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::fetch::BasicClient;
use crate::fetch::auth::ApiKey;

pub const DEFAULT_VEHICLE_POSITIONS_URL: &str =
    "https://api.wmata.com/gtfs/rail-gtfsrt-vehiclepositions.pb";
pub const DEFAULT_TRIP_UPDATES_URL: &str = "https://api.wmata.com/gtfs/rail-gtfsrt-tripupdates.pb";
pub const DEFAULT_KEY_HEADER: &str = "api_key";
pub const DEFAULT_KEY_FILE: &str = "key.txt";
pub const DEFAULT_SHAPES_FILE: &str = "static/shapes.csv";

#[derive(Clone)]
pub struct FeedConfig {
    pub vehicle_positions_url: String,
    pub trip_updates_url: String,
    /// Header carrying the key, `api_key` for the WMATA endpoints.
    pub key_header: String,
    api_key: String,
}

impl FeedConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            vehicle_positions_url: DEFAULT_VEHICLE_POSITIONS_URL.to_string(),
            trip_updates_url: DEFAULT_TRIP_UPDATES_URL.to_string(),
            key_header: DEFAULT_KEY_HEADER.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Builds a config whose key comes from the file at `key_path`.
    pub fn from_key_file(key_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(read_api_key(key_path)?))
    }

    pub fn with_vehicle_positions_url(mut self, url: impl Into<String>) -> Self {
        self.vehicle_positions_url = url.into();
        self
    }

    pub fn with_trip_updates_url(mut self, url: impl Into<String>) -> Self {
        self.trip_updates_url = url.into();
        self
    }

    pub fn with_key_header(mut self, header: impl Into<String>) -> Self {
        self.key_header = header.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The authenticated client every fetch of this config goes through.
    pub fn client(&self) -> Result<ApiKey<BasicClient>> {
        ApiKey::new(BasicClient::new(), &self.key_header, &self.api_key)
    }
}

impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("vehicle_positions_url", &self.vehicle_positions_url)
            .field("trip_updates_url", &self.trip_updates_url)
            .field("key_header", &self.key_header)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Reads an API key from `path`, trimming surrounding whitespace.
///
/// # Errors
///
/// [`Error::Config`] if the file cannot be read or holds only whitespace.
pub fn read_api_key(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read key file {}: {e}", path.display())))?;
    let key = content.trim();
    if key.is_empty() {
        return Err(Error::Config(format!("key file {} is empty", path.display())));
    }
    debug!(path = %path.display(), "API key loaded");
    Ok(key.to_string())
}
