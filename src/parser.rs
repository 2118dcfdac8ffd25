//! Protobuf parser for GTFS Realtime feeds.

use prost::Message;
use tracing::debug;

use crate::error::Result;
use crate::gtfs_rt::FeedMessage;

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// Only schema conformance is checked here; field presence is the
/// flattener's concern.
///
/// # Errors
///
/// Returns [`Error::Decode`](crate::Error::Decode) if the bytes are not valid
/// protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage> {
    let feed = FeedMessage::decode(bytes)?;
    debug!(
        bytes = bytes.len(),
        entities = feed.entity.len(),
        version = %feed.header.gtfs_realtime_version,
        "Decoded feed"
    );
    Ok(feed)
}
