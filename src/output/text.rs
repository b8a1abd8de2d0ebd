//! Human-readable text output

use crate::coordinator::RunReport;
use crate::stats::aggregator::Summary;
use crate::util::time::{format_bytes, format_duration, format_rate, format_throughput};
use std::fmt::Write;

/// Render one summary block
///
/// Displays:
/// - Latency moments and percentiles
/// - Elapsed span and request rate
/// - Data transferred
/// - Status bucket counts with their share of the total
pub fn format_summary(summary: &Summary) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "Timing");
    match summary.latency {
        Some(ref latency) => {
            let _ = writeln!(out, "Mean query speed:     {}", format_duration(latency.mean));
            let _ = writeln!(out, "Fastest query speed:  {}", format_duration(latency.min));
            let _ = writeln!(out, "Slowest query speed:  {}", format_duration(latency.max));
            let _ = writeln!(out, "Standard deviation:   {}", format_duration(latency.stddev));
            for (percentile, value) in &latency.percentiles {
                let label = format!("{}th percentile:", percentile);
                let _ = writeln!(out, "{:<22}{}", label, format_duration(*value));
            }
        }
        None => {
            let _ = writeln!(out, "No requests completed");
        }
    }
    let _ = writeln!(out, "Total time:           {}", format_duration(summary.span));
    let _ = writeln!(out, "Request rate:         {}", format_rate(summary.throughput));

    let _ = writeln!(out);
    let _ = writeln!(out, "Data Transferred");
    let _ = writeln!(out, "Mean query:           {}", format_bytes(summary.mean_bytes.round() as u64));
    let _ = writeln!(out, "Total:                {}", format_bytes(summary.total_bytes));
    let bytes_rate = if summary.span.is_zero() {
        0.0
    } else {
        summary.total_bytes as f64 / summary.span.as_secs_f64()
    };
    let _ = writeln!(out, "Transfer rate:        {}", format_throughput(bytes_rate));

    let _ = writeln!(out);
    let _ = writeln!(out, "Response Codes");
    for (label, count) in summary.buckets.entries() {
        if count > 0 {
            let _ = writeln!(
                out,
                "{}: {} responses ({:.2}%)",
                label,
                count,
                summary.percent(count)
            );
        }
    }

    out
}

/// Render the end-of-run report
///
/// With several targets, each target's block comes first, followed by the
/// global block.
pub fn format_report(report: &RunReport) -> String {
    let mut out = String::from("\n----Summary----\n\n");

    if report.targets.len() > 1 {
        for target in &report.targets {
            out.push_str(&format!(
                "----Target {}: {} {}\n",
                target.index + 1,
                target.spec.method,
                target.spec.url
            ));
            out.push_str(&format_summary(&target.summary));
            out.push('\n');
        }
        out.push_str("----Global----\n");
    }

    out.push_str(&format_summary(&report.global_summary));
    out
}

/// Print the end-of-run report to stdout
pub fn print_report(report: &RunReport) {
    println!("{}", format_report(report));
}
