//! CSV output formatting
//!
//! One row per request, no header row:
//! start time, duration in nanoseconds, status code, `"<N> bytes"`.

use crate::stats::OutcomeRecord;
use crate::Result;
use anyhow::Context;
use std::path::Path;

/// Start time layout, e.g. `2024-03-01 12:00:00.5 +0000 UTC`
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z %Z";

/// Write `records` to `path` as headerless CSV
pub fn write_csv(path: &Path, records: &[OutcomeRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    for record in records {
        writer
            .write_record(csv_row(record))
            .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}

/// Columns of one record
pub fn csv_row(record: &OutcomeRecord) -> [String; 4] {
    [
        record.start_time.format(START_TIME_FORMAT).to_string(),
        record.duration.as_nanos().to_string(),
        record.status_code.to_string(),
        format!("{} bytes", record.data_transferred),
    ]
}
