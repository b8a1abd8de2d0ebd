//! Output module
//!
//! Console, text summary, JSON and CSV rendering of run results.

pub mod console;
pub mod csv;
pub mod json;
pub mod text;

use crate::config::OutputConfig;
use crate::stats::OutcomeRecord;
use crate::Result;
use std::io::{self, Write};
use std::path::Path;

/// Write the configured result files, announcing each one on `progress`
pub fn write_result_files(
    output: &OutputConfig,
    records: &[OutcomeRecord],
    progress: &mut dyn Write,
) -> Result<()> {
    if let Some(ref path) = output.json_output {
        with_progress(path, progress, || self::json::write_json(path, records))?;
    }
    if let Some(ref path) = output.csv_output {
        with_progress(path, progress, || self::csv::write_csv(path, records))?;
    }
    Ok(())
}

fn with_progress(
    path: &Path,
    progress: &mut dyn Write,
    write: impl FnOnce() -> Result<()>,
) -> Result<()> {
    write!(progress, "Writing full result data to: {} ...", path.display())?;
    progress.flush()?;
    write()?;
    writeln!(progress, "finished!")?;
    Ok(())
}

/// Write the configured result files with progress on stdout
pub fn write_result_files_stdout(output: &OutputConfig, records: &[OutcomeRecord]) -> Result<()> {
    write_result_files(output, records, &mut io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn records(n: usize) -> Vec<OutcomeRecord> {
        (0..n)
            .map(|_| {
                OutcomeRecord::success(
                    "HTTP/1.1",
                    "http://localhost/",
                    "GET",
                    Utc::now(),
                    Duration::from_millis(1),
                    200,
                    5,
                )
            })
            .collect()
    }

    #[test]
    fn test_no_paths_writes_nothing() {
        let mut progress = Vec::new();
        write_result_files(&OutputConfig::default(), &records(3), &mut progress).unwrap();
        assert!(progress.is_empty());
    }

    #[test]
    fn test_both_files_with_progress() {
        let dir = TempDir::new().unwrap();
        let output = OutputConfig {
            json_output: Some(dir.path().join("r.json")),
            csv_output: Some(dir.path().join("r.csv")),
        };
        let mut progress = Vec::new();

        write_result_files(&output, &records(4), &mut progress).unwrap();

        let text = String::from_utf8(progress).unwrap();
        assert_eq!(text.matches("finished!").count(), 2);
        assert!(text.contains(&format!(
            "Writing full result data to: {} ...finished!",
            dir.path().join("r.json").display()
        )));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("r.json")).unwrap())
                .unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
        let csv = std::fs::read_to_string(dir.path().join("r.csv")).unwrap();
        assert_eq!(csv.lines().count(), 4);
    }
}
