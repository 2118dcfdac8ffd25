//! Flattening of decoded GTFS-RT messages into tabular records.
//!
//! [`vehicle`] produces one row per vehicle-position entity, [`trip_update`]
//! one row per stop-time update. Both share the trip-descriptor helpers
//! below so required-field handling and time parsing stay identical.

pub mod trip_update;
pub mod vehicle;

pub use trip_update::{TripUpdateRecord, flatten_trip_updates};
pub use vehicle::{VehiclePositionRecord, VehiclePositionTable, flatten_vehicle_positions};

use chrono::{DateTime, Local, NaiveDate, NaiveTime};

use crate::error::{Error, Result};
use crate::gtfs_rt::TripDescriptor;
use crate::time;

/// Trip fields every flattened row carries.
struct TripKey {
    trip_id: String,
    start_time: NaiveTime,
    start_date: NaiveDate,
}

fn trip_key(entity_id: &str, trip: &TripDescriptor) -> Result<TripKey> {
    let trip_id = required(entity_id, "trip.trip_id", trip.trip_id.as_ref())?.clone();

    let raw_time = required(entity_id, "trip.start_time", trip.start_time.as_ref())?;
    let start_time = time::parse_start_time(raw_time)
        .ok_or_else(|| Error::invalid(entity_id, "trip.start_time", raw_time))?;

    let raw_date = required(entity_id, "trip.start_date", trip.start_date.as_ref())?;
    let start_date = time::parse_start_date(raw_date)
        .ok_or_else(|| Error::invalid(entity_id, "trip.start_date", raw_date))?;

    Ok(TripKey {
        trip_id,
        start_time,
        start_date,
    })
}

fn required<T>(entity_id: &str, field: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::missing(entity_id, field))
}

/// Maps a raw protobuf enum number onto its generated Rust enum.
fn enum_value<E: TryFrom<i32>>(entity_id: &str, field: &'static str, raw: i32) -> Result<E> {
    E::try_from(raw).map_err(|_| Error::invalid(entity_id, field, raw))
}

fn optional_enum<E: TryFrom<i32>>(
    entity_id: &str,
    field: &'static str,
    raw: Option<i32>,
) -> Result<Option<E>> {
    raw.map(|v| enum_value(entity_id, field, v)).transpose()
}

fn epoch_signed(entity_id: &str, field: &'static str, secs: i64) -> Result<DateTime<Local>> {
    time::local_from_epoch(secs).ok_or_else(|| Error::invalid(entity_id, field, secs))
}

fn epoch_unsigned(entity_id: &str, field: &'static str, secs: u64) -> Result<DateTime<Local>> {
    time::local_from_epoch_unsigned(secs).ok_or_else(|| Error::invalid(entity_id, field, secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::trip_descriptor::ScheduleRelationship;

    fn trip(start_time: &str, start_date: &str) -> TripDescriptor {
        TripDescriptor {
            trip_id: Some("T1".to_string()),
            start_time: Some(start_time.to_string()),
            start_date: Some(start_date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_trip_key_parses_time_and_date() {
        let key = trip_key("e1", &trip("14:05:30", "20240115")).unwrap();
        assert_eq!(key.trip_id, "T1");
        assert_eq!(key.start_time, NaiveTime::from_hms_opt(14, 5, 30).unwrap());
        assert_eq!(key.start_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_trip_key_reports_unparsable_time() {
        let err = trip_key("e1", &trip("2:05 PM", "20240115")).err().unwrap();
        assert!(matches!(
            err,
            Error::InvalidField { field: "trip.start_time", .. }
        ));
    }

    #[test]
    fn test_trip_key_reports_missing_date() {
        let mut t = trip("14:05:30", "20240115");
        t.start_date = None;
        let err = trip_key("e1", &t).err().unwrap();
        assert!(matches!(
            err,
            Error::MissingField { field: "trip.start_date", .. }
        ));
    }

    #[test]
    fn test_enum_value_rejects_unknown_number() {
        let ok: ScheduleRelationship = enum_value("e1", "trip.schedule_relationship", 3).unwrap();
        assert_eq!(ok, ScheduleRelationship::Canceled);

        let err = enum_value::<ScheduleRelationship>("e1", "trip.schedule_relationship", 42);
        assert!(err.is_err());
    }

    #[test]
    fn test_optional_enum_keeps_absence() {
        let absent: Option<ScheduleRelationship> =
            optional_enum("e1", "trip.schedule_relationship", None).unwrap();
        assert!(absent.is_none());
    }
}
