use chrono::{DateTime, Local};
use serde::Serialize;

use crate::gtfs_rt::FeedMessage;
use crate::time::local_from_epoch_unsigned;

/// Entity counts and optional-field coverage for one feed snapshot.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FeedSummary {
    pub feed_timestamp: Option<DateTime<Local>>,
    pub total_entities: usize,
    pub deleted: usize,

    // entity types
    pub vehicles: usize,
    pub trip_updates: usize,
    pub alerts: usize,
    pub stop_time_updates: usize,

    // optional vehicle fields
    pub with_current_stop_sequence: usize,
    pub with_current_status: usize,
    pub with_stop_id: usize,
    pub with_occupancy: usize,

    // optional stop-time fields
    pub with_arrival: usize,
    pub with_departure: usize,
}

impl FeedSummary {
    pub fn from_feed(feed: &FeedMessage) -> Self {
        let mut s = FeedSummary {
            feed_timestamp: feed.header.timestamp.and_then(local_from_epoch_unsigned),
            total_entities: feed.entity.len(),
            ..Default::default()
        };

        for e in &feed.entity {
            if e.is_deleted == Some(true) {
                s.deleted += 1;
            }

            if let Some(v) = &e.vehicle {
                s.vehicles += 1;
                s.with_current_stop_sequence += v.current_stop_sequence.is_some() as usize;
                s.with_current_status += v.current_status.is_some() as usize;
                s.with_stop_id += v.stop_id.is_some() as usize;
                s.with_occupancy += v.occupancy_status.is_some() as usize;
            }

            if let Some(tu) = &e.trip_update {
                s.trip_updates += 1;
                s.stop_time_updates += tu.stop_time_update.len();
                for stu in &tu.stop_time_update {
                    s.with_arrival += stu.arrival.as_ref().is_some_and(|a| a.time.is_some()) as usize;
                    s.with_departure +=
                        stu.departure.as_ref().is_some_and(|d| d.time.is_some()) as usize;
                }
            }

            if e.alert.is_some() {
                s.alerts += 1;
            }
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn occupancy_pct(&self) -> f64 {
        Self::pct(self.with_occupancy, self.vehicles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
    use crate::gtfs_rt::{Alert, FeedEntity, FeedHeader, TripUpdate, VehiclePosition};

    fn header() -> FeedHeader {
        FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(1_700_000_000),
            incrementality: None,
            feed_version: None,
        }
    }

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(FeedSummary::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(FeedSummary::pct(1, 4), 25.0);
    }

    #[test]
    fn test_from_feed_empty() {
        let summary = FeedSummary::from_feed(&FeedMessage {
            header: header(),
            entity: vec![],
        });

        assert_eq!(summary.total_entities, 0);
        assert_eq!(summary.feed_timestamp.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_from_feed_counts_kinds_and_coverage() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![
                FeedEntity {
                    id: "v1".to_string(),
                    vehicle: Some(VehiclePosition {
                        occupancy_status: Some(1),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                FeedEntity {
                    id: "v2".to_string(),
                    is_deleted: Some(true),
                    vehicle: Some(VehiclePosition::default()),
                    ..Default::default()
                },
                FeedEntity {
                    id: "t1".to_string(),
                    trip_update: Some(TripUpdate {
                        stop_time_update: vec![
                            StopTimeUpdate {
                                arrival: Some(StopTimeEvent {
                                    time: Some(1),
                                    ..Default::default()
                                }),
                                ..Default::default()
                            },
                            StopTimeUpdate::default(),
                        ],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                FeedEntity {
                    id: "a1".to_string(),
                    alert: Some(Alert::default()),
                    ..Default::default()
                },
            ],
        };

        let s = FeedSummary::from_feed(&feed);
        assert_eq!(s.total_entities, 4);
        assert_eq!(s.deleted, 1);
        assert_eq!(s.vehicles, 2);
        assert_eq!(s.trip_updates, 1);
        assert_eq!(s.alerts, 1);
        assert_eq!(s.stop_time_updates, 2);
        assert_eq!(s.with_arrival, 1);
        assert_eq!(s.with_departure, 0);
        assert_eq!(s.occupancy_pct(), 50.0);
    }
}
