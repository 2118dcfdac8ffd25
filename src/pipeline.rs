//! One fetch → decode → flatten cycle.
//!
//! A cycle holds no state between calls: the same bytes always yield the
//! same snapshot.

use tracing::info;

use crate::error::Result;
use crate::fetch::{FeedSource, HttpClient};
use crate::flatten::{
    TripUpdateRecord, VehiclePositionRecord, flatten_trip_updates, flatten_vehicle_positions,
};
use crate::parser::parse_feed;
use crate::stats::FeedSummary;

/// Rows of one refresh together with the summary of the feed they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub rows: Vec<T>,
    pub summary: FeedSummary,
}

pub fn vehicle_positions_from_bytes(bytes: &[u8]) -> Result<Snapshot<VehiclePositionRecord>> {
    let feed = parse_feed(bytes)?;
    Ok(Snapshot {
        rows: flatten_vehicle_positions(&feed)?,
        summary: FeedSummary::from_feed(&feed),
    })
}

pub fn trip_updates_from_bytes(bytes: &[u8]) -> Result<Snapshot<TripUpdateRecord>> {
    let feed = parse_feed(bytes)?;
    Ok(Snapshot {
        rows: flatten_trip_updates(&feed)?,
        summary: FeedSummary::from_feed(&feed),
    })
}

#[tracing::instrument(skip_all, fields(source = %source))]
pub fn refresh_vehicle_positions<C: HttpClient + ?Sized>(
    client: &C,
    source: &FeedSource,
) -> Result<Snapshot<VehiclePositionRecord>> {
    let bytes = source.load(client)?;
    let snapshot = vehicle_positions_from_bytes(&bytes)?;
    info!(
        vehicles = snapshot.rows.len(),
        entities = snapshot.summary.total_entities,
        "Vehicle positions refreshed"
    );
    Ok(snapshot)
}

#[tracing::instrument(skip_all, fields(source = %source))]
pub fn refresh_trip_updates<C: HttpClient + ?Sized>(
    client: &C,
    source: &FeedSource,
) -> Result<Snapshot<TripUpdateRecord>> {
    let bytes = source.load(client)?;
    let snapshot = trip_updates_from_bytes(&bytes)?;
    info!(
        rows = snapshot.rows.len(),
        trip_updates = snapshot.summary.trip_updates,
        "Trip updates refreshed"
    );
    Ok(snapshot)
}
