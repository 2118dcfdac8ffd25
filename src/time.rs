//! Conversions for the textual and epoch time fields of GTFS-RT messages.

use chrono::{DateTime, Local, NaiveDate, NaiveTime};

/// Parses a trip start time in `HH:MM:SS` form.
///
/// Service-day times past midnight (`25:10:00`) are not representable as a
/// time of day and are rejected.
pub fn parse_start_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S").ok()
}

/// Parses a trip start date in `YYYYMMDD` form.
pub fn parse_start_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

/// Converts POSIX seconds into a local point in time.
///
/// Every epoch field (vehicle timestamp, arrival, departure) goes through
/// this one function.
pub fn local_from_epoch(secs: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&Local))
}

/// Unsigned variant for the `uint64` timestamp fields.
pub fn local_from_epoch_unsigned(secs: u64) -> Option<DateTime<Local>> {
    i64::try_from(secs).ok().and_then(local_from_epoch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_start_time() {
        let t = parse_start_time("14:05:30").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (14, 5, 30));
    }

    #[test]
    fn test_parse_start_time_rejects_bad_input() {
        assert!(parse_start_time("25:10:00").is_none());
        assert!(parse_start_time("14:05").is_none());
        assert!(parse_start_time("").is_none());
    }

    #[test]
    fn test_parse_start_date() {
        let d = parse_start_date("20240115").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 1, 15));
    }

    #[test]
    fn test_parse_start_date_rejects_bad_input() {
        assert!(parse_start_date("2024-01-15").is_none());
        assert!(parse_start_date("20241315").is_none());
        assert!(parse_start_date("2024011").is_none());
    }

    #[test]
    fn test_epoch_conversion_is_shared() {
        let signed = local_from_epoch(1_700_000_000).unwrap();
        let unsigned = local_from_epoch_unsigned(1_700_000_000).unwrap();
        assert_eq!(signed, unsigned);
        assert_eq!(signed.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_epoch_out_of_range() {
        assert!(local_from_epoch_unsigned(u64::MAX).is_none());
        assert!(local_from_epoch(i64::MAX).is_none());
    }
}
