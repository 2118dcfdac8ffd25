use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::debug;

use super::{enum_value, epoch_unsigned, optional_enum, required, trip_key};
use crate::error::{Error, Result};
use crate::gtfs_rt::trip_descriptor::ScheduleRelationship;
use crate::gtfs_rt::vehicle_position::{OccupancyStatus, VehicleStopStatus};
use crate::gtfs_rt::{FeedEntity, FeedMessage, VehiclePosition};

/// One row per vehicle-position entity in a feed snapshot.
///
/// Optional source fields stay `None` when absent; they are never replaced
/// by zero or an empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehiclePositionRecord {
    pub id: String,
    pub is_deleted: bool,
    pub trip_id: String,
    pub start_time: NaiveTime,
    pub start_date: NaiveDate,
    pub schedule_relationship: ScheduleRelationship,
    pub route_id: String,
    pub direction_id: u32,
    pub latitude: f32,
    pub longitude: f32,
    pub bearing: f32,
    pub current_stop_sequence: Option<u32>,
    pub current_status: Option<VehicleStopStatus>,
    pub timestamp: DateTime<Local>,
    pub stop_id: Option<String>,
    pub vehicle_id: String,
    pub label: String,
    pub license_plate: String,
    pub occupancy_status: Option<OccupancyStatus>,
}

impl VehiclePositionRecord {
    /// Builds the row for `entity`, whose vehicle message is `vehicle`.
    pub fn from_entity(entity: &FeedEntity, vehicle: &VehiclePosition) -> Result<Self> {
        let id = entity.id.as_str();

        let trip = required(id, "vehicle.trip", vehicle.trip.as_ref())?;
        let key = trip_key(id, trip)?;
        let schedule_relationship = enum_value(
            id,
            "trip.schedule_relationship",
            required(id, "trip.schedule_relationship", trip.schedule_relationship)?,
        )?;
        let route_id = required(id, "trip.route_id", trip.route_id.as_ref())?.clone();
        let direction_id = required(id, "trip.direction_id", trip.direction_id)?;

        let position = required(id, "vehicle.position", vehicle.position.as_ref())?;
        let latitude = required(id, "position.latitude", position.latitude)?;
        let longitude = required(id, "position.longitude", position.longitude)?;
        let bearing = required(id, "position.bearing", position.bearing)?;

        let descriptor = required(id, "vehicle.vehicle", vehicle.vehicle.as_ref())?;
        let vehicle_id = required(id, "vehicle.id", descriptor.id.as_ref())?.clone();
        let label = required(id, "vehicle.label", descriptor.label.as_ref())?.clone();
        let license_plate =
            required(id, "vehicle.license_plate", descriptor.license_plate.as_ref())?.clone();

        let timestamp = epoch_unsigned(
            id,
            "vehicle.timestamp",
            required(id, "vehicle.timestamp", vehicle.timestamp)?,
        )?;

        Ok(Self {
            id: entity.id.clone(),
            is_deleted: entity.is_deleted.unwrap_or(false),
            trip_id: key.trip_id,
            start_time: key.start_time,
            start_date: key.start_date,
            schedule_relationship,
            route_id,
            direction_id,
            latitude,
            longitude,
            bearing,
            current_stop_sequence: vehicle.current_stop_sequence,
            current_status: optional_enum(id, "vehicle.current_status", vehicle.current_status)?,
            timestamp,
            stop_id: vehicle.stop_id.clone(),
            vehicle_id,
            label,
            license_plate,
            occupancy_status: optional_enum(
                id,
                "vehicle.occupancy_status",
                vehicle.occupancy_status,
            )?,
        })
    }
}

/// Flattens every vehicle-position entity of `feed` into a record.
///
/// Entities without a vehicle message are skipped. Rows keep the entity
/// order of the feed. A repeated entity id fails the whole snapshot.
#[tracing::instrument(skip_all, fields(entities = feed.entity.len()))]
pub fn flatten_vehicle_positions(feed: &FeedMessage) -> Result<Vec<VehiclePositionRecord>> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for entity in &feed.entity {
        let Some(vehicle) = &entity.vehicle else {
            continue;
        };
        if !seen.insert(entity.id.as_str()) {
            return Err(Error::DuplicateEntity(entity.id.clone()));
        }
        rows.push(VehiclePositionRecord::from_entity(entity, vehicle)?);
    }

    debug!(rows = rows.len(), "Flattened vehicle positions");
    Ok(rows)
}

/// Vehicle-position rows of one snapshot, in feed order, indexed by entity id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePositionTable {
    rows: Vec<VehiclePositionRecord>,
    index: HashMap<String, usize>,
}

impl From<Vec<VehiclePositionRecord>> for VehiclePositionTable {
    fn from(rows: Vec<VehiclePositionRecord>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.id.clone(), i))
            .collect();
        Self { rows, index }
    }
}

impl VehiclePositionTable {
    pub fn get(&self, entity_id: &str) -> Option<&VehiclePositionRecord> {
        self.index.get(entity_id).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehiclePositionRecord> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::{
        FeedHeader, Position, TripDescriptor, TripUpdate, VehicleDescriptor,
    };
    use chrono::Timelike;

    fn vehicle_entity(id: &str) -> FeedEntity {
        FeedEntity {
            id: id.to_string(),
            vehicle: Some(VehiclePosition {
                trip: Some(TripDescriptor {
                    trip_id: Some(format!("trip-{id}")),
                    route_id: Some("RED".to_string()),
                    direction_id: Some(1),
                    start_time: Some("14:05:30".to_string()),
                    start_date: Some("20240115".to_string()),
                    schedule_relationship: Some(ScheduleRelationship::Scheduled as i32),
                }),
                vehicle: Some(VehicleDescriptor {
                    id: Some(format!("car-{id}")),
                    label: Some("Shady Grove".to_string()),
                    license_plate: Some("7000".to_string()),
                }),
                position: Some(Position {
                    latitude: Some(38.9),
                    longitude: Some(-77.0),
                    bearing: Some(90.0),
                    odometer: None,
                    speed: None,
                }),
                timestamp: Some(1_700_000_000),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn feed(entity: Vec<FeedEntity>) -> FeedMessage {
        FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_string(),
                timestamp: Some(1_700_000_000),
                incrementality: None,
                feed_version: None,
            },
            entity,
        }
    }

    #[test]
    fn test_flatten_one_row_per_vehicle_entity() {
        let trip_only = FeedEntity {
            id: "tu".to_string(),
            trip_update: Some(TripUpdate::default()),
            ..Default::default()
        };
        let rows = flatten_vehicle_positions(&feed(vec![
            vehicle_entity("1"),
            trip_only,
            vehicle_entity("2"),
        ]))
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[1].id, "2");
    }

    #[test]
    fn test_flatten_reads_nested_fields() {
        let rows = flatten_vehicle_positions(&feed(vec![vehicle_entity("7")])).unwrap();
        let row = &rows[0];

        assert_eq!(row.trip_id, "trip-7");
        assert_eq!(row.route_id, "RED");
        assert_eq!(row.direction_id, 1);
        assert_eq!(row.schedule_relationship, ScheduleRelationship::Scheduled);
        assert_eq!(row.start_time.hour(), 14);
        assert_eq!(row.vehicle_id, "car-7");
        assert_eq!(row.label, "Shady Grove");
        assert_eq!(row.license_plate, "7000");
        assert_eq!(row.bearing, 90.0);
        assert_eq!(row.timestamp.timestamp(), 1_700_000_000);
        assert!(!row.is_deleted);
    }

    #[test]
    fn test_missing_optional_fields_are_none() {
        let rows = flatten_vehicle_positions(&feed(vec![vehicle_entity("1")])).unwrap();
        let row = &rows[0];

        assert_eq!(row.occupancy_status, None);
        assert_eq!(row.current_status, None);
        assert_eq!(row.current_stop_sequence, None);
        assert_eq!(row.stop_id, None);
    }

    #[test]
    fn test_present_optional_fields_are_kept() {
        let mut entity = vehicle_entity("1");
        let vehicle = entity.vehicle.as_mut().unwrap();
        vehicle.current_stop_sequence = Some(0);
        vehicle.current_status = Some(VehicleStopStatus::StoppedAt as i32);
        vehicle.stop_id = Some(String::new());
        vehicle.occupancy_status = Some(OccupancyStatus::Full as i32);

        let row = &flatten_vehicle_positions(&feed(vec![entity])).unwrap()[0];
        assert_eq!(row.current_stop_sequence, Some(0));
        assert_eq!(row.current_status, Some(VehicleStopStatus::StoppedAt));
        assert_eq!(row.stop_id.as_deref(), Some(""));
        assert_eq!(row.occupancy_status, Some(OccupancyStatus::Full));
    }

    #[test]
    fn test_missing_required_field_is_error() {
        let mut entity = vehicle_entity("9");
        entity.vehicle.as_mut().unwrap().vehicle.as_mut().unwrap().id = None;

        let err = flatten_vehicle_positions(&feed(vec![entity])).unwrap_err();
        match err {
            Error::MissingField { entity_id, field } => {
                assert_eq!(entity_id, "9");
                assert_eq!(field, "vehicle.id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_bearing_is_error() {
        let mut entity = vehicle_entity("9");
        entity
            .vehicle
            .as_mut()
            .unwrap()
            .position
            .as_mut()
            .unwrap()
            .bearing = None;

        let err = flatten_vehicle_positions(&feed(vec![entity])).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField { field: "position.bearing", .. }
        ));
    }

    #[test]
    fn test_missing_coordinates_are_error() {
        let mut entity = vehicle_entity("9");
        entity.vehicle.as_mut().unwrap().position.as_mut().unwrap().latitude = None;
        let err = flatten_vehicle_positions(&feed(vec![entity])).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField { field: "position.latitude", .. }
        ));

        let mut entity = vehicle_entity("9");
        entity.vehicle.as_mut().unwrap().position.as_mut().unwrap().longitude = None;
        let err = flatten_vehicle_positions(&feed(vec![entity])).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField { field: "position.longitude", .. }
        ));
    }

    #[test]
    fn test_duplicate_entity_id_is_error() {
        let err = flatten_vehicle_positions(&feed(vec![vehicle_entity("1"), vehicle_entity("1")]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEntity(id) if id == "1"));
    }

    #[test]
    fn test_deleted_flag_is_carried() {
        let mut entity = vehicle_entity("1");
        entity.is_deleted = Some(true);

        let rows = flatten_vehicle_positions(&feed(vec![entity])).unwrap();
        assert!(rows[0].is_deleted);
    }

    #[test]
    fn test_table_lookup_by_entity_id() {
        let rows =
            flatten_vehicle_positions(&feed(vec![vehicle_entity("b"), vehicle_entity("a")]))
                .unwrap();
        let table = VehiclePositionTable::from(rows);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a").unwrap().vehicle_id, "car-a");
        assert!(table.get("zzz").is_none());
        let order: Vec<_> = table.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, ["b", "a"]);
    }
}
