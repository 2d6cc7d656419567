//! Plain text report blocks

use std::fmt::Write;

use crate::aggregate::{ProcessAggregate, ProcessKey, Summary};
use crate::model::Metric;

/// Counts, averages, maxima and peak times
pub fn summary_block(summary: &Summary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[Summary - system metrics]");
    let _ = writeln!(out, "  Samples: {}", summary.count);
    for metric in Metric::ALL {
        let m = summary.metric(metric);
        let _ = writeln!(out, "  {:<4} avg/max: {:.2} / {:.2}", metric.label(), m.average, m.maximum);
    }

    let _ = writeln!(out, "[Summary - peak times (UTC/{})]", summary.secondary_zone);
    for metric in Metric::ALL {
        let m = summary.metric(metric);
        let _ = writeln!(
            out,
            "  {:<4} peak: UTC {} | {} {}",
            metric.label(),
            m.maximum_at_utc.format("%Y-%m-%dT%H:%M:%S%:z"),
            summary.secondary_zone,
            m.maximum_at_secondary.format("%Y-%m-%dT%H:%M:%S%:z"),
        );
    }

    out
}

/// Numbered table of ranked processes
pub fn process_table(ranked: &[&ProcessAggregate], key: ProcessKey, n: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[Processes - top {} by {}]", n, key.label());
    for (i, item) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}) {:<20} | CPU {:>5.1}% | MEM {:>5.1}% | seen {:>3}x",
            i + 1,
            item.name,
            item.cpu_avg,
            item.mem_avg,
            item.count
        );
    }

    out
}
