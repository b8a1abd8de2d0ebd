//! JSON output formatting
//!
//! Writes the full record collection as one pretty-printed JSON array. Field
//! names are camelCase, timestamps are RFC 3339 and durations are integer
//! nanoseconds (see [`OutcomeRecord`]).

use crate::stats::OutcomeRecord;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `records` to `path` as a pretty-printed JSON array
pub fn write_json(path: &Path, records: &[OutcomeRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("Failed to serialize results to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}
