//! Metric sampling
//!
//! Builds one [`SampleRecord`] per tick from whatever [`MetricsProvider`] the
//! caller hands in.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::model::{ProcessSnapshot, RankBy, SampleRecord, UNKNOWN_PROCESS};
use crate::provider::{MetricsProvider, ProcessReading};

/// Produces sample records for a fixed disk mount
#[derive(Debug, Clone)]
pub struct MetricSampler {
    mount: PathBuf,
}

impl MetricSampler {
    pub fn new(mount: impl Into<PathBuf>) -> Self {
        Self {
            mount: mount.into(),
        }
    }

    pub fn mount(&self) -> &Path {
        &self.mount
    }

    /// Take one snapshot of system utilization.
    ///
    /// Never fails: an unreadable disk reports 0.0, unreadable process
    /// fields fall back to `"unknown"` and 0.0. With `top_n == 0` the process
    /// table is not enumerated at all.
    pub fn sample(
        &self,
        provider: &mut dyn MetricsProvider,
        top_n: usize,
        rank_by: RankBy,
    ) -> SampleRecord {
        let timestamp = Utc::now();
        provider.refresh(top_n > 0);

        let cpu = provider.cpu_percent();
        let mem = provider.virtual_memory_percent();
        let disk = match provider.disk_percent(&self.mount) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    mount = %self.mount.display(),
                    "Disk usage unavailable, recording 0.0: {}",
                    e
                );
                0.0
            }
        };

        let processes = if top_n > 0 {
            rank_processes(provider.list_processes(), top_n, rank_by)
        } else {
            Vec::new()
        };

        SampleRecord::new(timestamp, cpu, mem, disk, processes)
    }
}

/// Normalize readings, sort descending by `rank_by` and keep the first `top_n`.
///
/// Ties keep ascending pid order so repeated runs over the same readings
/// produce the same record.
pub fn rank_processes(readings: Vec<ProcessReading>, top_n: usize, rank_by: RankBy) -> Vec<ProcessSnapshot> {
    let mut snapshots: Vec<ProcessSnapshot> = readings.into_iter().map(to_snapshot).collect();

    snapshots.sort_by(|a, b| {
        b.value(rank_by)
            .partial_cmp(&a.value(rank_by))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.pid.cmp(&b.pid))
    });
    snapshots.truncate(top_n);
    snapshots
}

fn to_snapshot(reading: ProcessReading) -> ProcessSnapshot {
    ProcessSnapshot {
        pid: reading.pid,
        name: reading
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_PROCESS.to_string()),
        cpu: finite_or_zero(reading.cpu),
        mem: finite_or_zero(reading.mem),
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}
