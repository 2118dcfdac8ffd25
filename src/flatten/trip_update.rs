use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::debug;

use super::{epoch_signed, optional_enum, trip_key};
use crate::error::Result;
use crate::gtfs_rt::trip_descriptor::ScheduleRelationship;
use crate::gtfs_rt::trip_update::StopTimeEvent;
use crate::gtfs_rt::{FeedEntity, FeedMessage, TripUpdate};

/// One row per (entity, stop-time update) pair.
///
/// Trip-level fields repeat on every row of the same entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripUpdateRecord {
    pub id: String,
    pub trip_id: String,
    pub start_time: NaiveTime,
    pub start_date: NaiveDate,
    pub schedule_relationship: Option<ScheduleRelationship>,
    pub route_id: Option<String>,
    pub direction_id: Option<u32>,
    pub stop_sequence: Option<u32>,
    pub arrival: Option<DateTime<Local>>,
    pub departure: Option<DateTime<Local>>,
    pub stop_id: Option<String>,
}

impl TripUpdateRecord {
    /// Expands one trip-update entity into its per-stop rows.
    pub fn from_entity(entity: &FeedEntity, update: &TripUpdate) -> Result<Vec<Self>> {
        if update.stop_time_update.is_empty() {
            return Ok(Vec::new());
        }

        let id = entity.id.as_str();
        let trip = &update.trip;
        let key = trip_key(id, trip)?;
        let schedule_relationship =
            optional_enum(id, "trip.schedule_relationship", trip.schedule_relationship)?;

        update
            .stop_time_update
            .iter()
            .map(|stu| -> Result<Self> {
                Ok(Self {
                    id: entity.id.clone(),
                    trip_id: key.trip_id.clone(),
                    start_time: key.start_time,
                    start_date: key.start_date,
                    schedule_relationship,
                    route_id: trip.route_id.clone(),
                    direction_id: trip.direction_id,
                    stop_sequence: stu.stop_sequence,
                    arrival: event_time(id, "stop_time_update.arrival", stu.arrival.as_ref())?,
                    departure: event_time(
                        id,
                        "stop_time_update.departure",
                        stu.departure.as_ref(),
                    )?,
                    stop_id: stu.stop_id.clone(),
                })
            })
            .collect()
    }
}

fn event_time(
    entity_id: &str,
    field: &'static str,
    event: Option<&StopTimeEvent>,
) -> Result<Option<DateTime<Local>>> {
    event
        .and_then(|e| e.time)
        .map(|secs| epoch_signed(entity_id, field, secs))
        .transpose()
}

/// Flattens every trip-update entity of `feed`, one row per stop-time update.
///
/// An entity with no stop-time updates contributes no rows.
#[tracing::instrument(skip_all, fields(entities = feed.entity.len()))]
pub fn flatten_trip_updates(feed: &FeedMessage) -> Result<Vec<TripUpdateRecord>> {
    let mut rows = Vec::new();

    for entity in &feed.entity {
        if let Some(update) = &entity.trip_update {
            rows.extend(TripUpdateRecord::from_entity(entity, update)?);
        }
    }

    debug!(rows = rows.len(), "Flattened trip updates");
    Ok(rows)
}
