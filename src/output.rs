//! Output formatting and persistence for flattened records and the map.
//!
//! Each refresh produces a fresh set of rows, so CSV files are rewritten
//! rather than appended to.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::stats::FeedSummary;

/// Logs a feed summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &FeedSummary) {
    info!("{:#?}", summary);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `rows` as CSV with a header row to any writer.
///
/// Absent optional fields become empty cells.
pub fn write_records_to<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Replaces the CSV file at `path` with `rows`.
pub fn write_records<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV records");
    write_records_to(File::create(path)?, rows)
}

/// Writes `value` as JSON to `path` through a sibling temp file and a rename,
/// so a reader never sees a half-written document and a failed write leaves
/// the previous file in place.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let tmp = temp_sibling(path);

    let result = (|| -> Result<()> {
        let mut file = File::create(&tmp)?;
        serde_json::to_writer(&mut file, value)?;
        file.flush()?;
        fs::rename(&tmp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
