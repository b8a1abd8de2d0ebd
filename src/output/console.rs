//! Console sink for per-request output
//!
//! Workers of every target write through one shared `ConsoleSink`. The sink
//! owns the lock around the writer, so lines from concurrent workers never
//! interleave: each report (status line plus any verbose detail) is written
//! while holding the lock.

use crate::config::RunConfig;
use crate::engine::Exchange;
use crate::request::BuiltRequest;
use crate::stats::OutcomeRecord;
use crate::util::time::format_duration;
use std::io::{self, Write};
use std::sync::Mutex;

/// Lock-owning writer for console lines
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    quiet: bool,
    verbose: bool,
}

impl ConsoleSink {
    /// Sink writing to stdout
    pub fn stdout(quiet: bool, verbose: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), quiet, verbose)
    }

    /// Sink writing to an arbitrary writer
    pub fn with_writer(writer: Box<dyn Write + Send>, quiet: bool, verbose: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            quiet,
            verbose,
        }
    }

    /// Sink configured from the run's global flags
    pub fn for_config(config: &RunConfig) -> Self {
        Self::stdout(config.quiet, config.verbose)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Write the status line of one request (and detail when verbose)
    ///
    /// Does nothing in quiet mode.
    pub fn report(&self, request: &BuiltRequest, record: &OutcomeRecord, exchange: &Exchange) {
        if self.quiet {
            return;
        }

        let mut text = status_line(record);
        text.push('\n');
        if self.verbose {
            text.push_str(&verbose_detail(request, exchange));
        }

        self.write_locked(&text);
    }

    /// Write the run header: target count and one line per target
    pub fn announce(&self, config: &RunConfig) {
        let mut text = format!("Stress testing {} target(s):\n", config.targets.len());
        for target in &config.targets {
            text.push_str(&format!(
                "- Running {} tests at {}, {} at a time\n",
                target.count, target.url, target.concurrency
            ));
        }
        self.write_locked(&text);
    }

    /// Write raw text under the lock
    pub fn write_text(&self, text: &str) {
        self.write_locked(text);
    }

    fn write_locked(&self, text: &str) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writer.write_all(text.as_bytes()).and_then(|_| writer.flush()) {
            tracing::warn!("Failed to write console output: {}", e);
        }
    }
}

/// One-line summary of a record
///
/// `<status> <proto> <method> <url> <duration> <bytes> bytes`, or
/// `ERROR <method> <url> <duration> <kind>: <message>` for a failed request.
pub fn status_line(record: &OutcomeRecord) -> String {
    match record.error {
        Some(ref error) => format!(
            "ERROR {} {} {} {}",
            record.method,
            record.url,
            format_duration(record.duration),
            error
        ),
        None => format!(
            "{} {} {} {} {} {} bytes",
            record.status_code,
            record.proto,
            record.method,
            record.url,
            format_duration(record.duration),
            record.data_transferred
        ),
    }
}

fn verbose_detail(request: &BuiltRequest, exchange: &Exchange) -> String {
    let mut text = String::from("  Request headers:\n");
    for (name, value) in request.headers.iter() {
        text.push_str(&format!(
            "    {}: {}\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
    if let Some(ref credential) = request.basic_auth {
        text.push_str(&format!("    authorization: Basic <{}>\n", credential.username));
    }
    if let Some(ref body) = request.body {
        text.push_str(&format!("  Request body: {} bytes\n", body.len()));
    }

    if !exchange.headers.is_empty() {
        text.push_str("  Response headers:\n");
        for (name, value) in &exchange.headers {
            text.push_str(&format!("    {}: {}\n", name, value));
        }
    }
    text
}
