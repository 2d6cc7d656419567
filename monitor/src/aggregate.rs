//! Statistics over a day of samples

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Serialize, Serializer};

use crate::config::{DEFAULT_SECONDARY_LABEL, DEFAULT_SECONDARY_OFFSET_HOURS};
use crate::model::{Metric, SampleRecord};

/// A named fixed-offset timezone used for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayZone {
    pub label: String,
    pub offset: FixedOffset,
}

impl DisplayZone {
    pub fn new(label: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            label: label.into(),
            offset,
        }
    }

    pub fn utc() -> Self {
        Self::new("UTC", Utc.fix())
    }

    /// Zone `hours` east of UTC, falling back to UTC for out-of-range offsets
    pub fn with_hours(label: impl Into<String>, hours: i32) -> Self {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self::new(label, offset)
    }

    /// Lowercase label, used in chart file names
    pub fn slug(&self) -> String {
        self.label.to_lowercase()
    }

    pub fn localize(&self, timestamp: &DateTime<Utc>) -> DateTime<FixedOffset> {
        timestamp.with_timezone(&self.offset)
    }

    /// `2024-01-01T09:00:00+09:00` style
    pub fn format(&self, timestamp: &DateTime<Utc>) -> String {
        self.localize(timestamp).format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::with_hours(DEFAULT_SECONDARY_LABEL, DEFAULT_SECONDARY_OFFSET_HOURS)
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.offset)
    }
}

/// Average and peak for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub average: f64,
    pub maximum: f64,
    #[serde(serialize_with = "serialize_utc")]
    pub maximum_at_utc: DateTime<Utc>,
    #[serde(serialize_with = "serialize_local")]
    pub maximum_at_secondary: DateTime<FixedOffset>,
}

/// Summary of all three system metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub secondary_zone: String,
    pub cpu: MetricSummary,
    pub mem: MetricSummary,
    pub disk: MetricSummary,
}

impl Summary {
    pub fn metric(&self, metric: Metric) -> &MetricSummary {
        match metric {
            Metric::Cpu => &self.cpu,
            Metric::Mem => &self.mem,
            Metric::Disk => &self.disk,
        }
    }
}

/// Per-process averages across every sample it appeared in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessAggregate {
    pub name: String,
    pub cpu_avg: f64,
    pub mem_avg: f64,
    pub count: usize,
}

/// Which average to rank aggregated processes by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKey {
    CpuAvg,
    MemAvg,
}

impl ProcessKey {
    pub fn label(&self) -> &'static str {
        match self {
            ProcessKey::CpuAvg => "CPU average",
            ProcessKey::MemAvg => "MEM average",
        }
    }

    pub fn value(&self, aggregate: &ProcessAggregate) -> f64 {
        match self {
            ProcessKey::CpuAvg => aggregate.cpu_avg,
            ProcessKey::MemAvg => aggregate.mem_avg,
        }
    }
}

/// Process aggregates keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProcessSummary {
    entries: BTreeMap<String, ProcessAggregate>,
}

impl ProcessSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&ProcessAggregate> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessAggregate> {
        self.entries.values()
    }

    /// The `n` highest entries by `key`, ties ordered by name
    pub fn top(&self, key: ProcessKey, n: usize) -> Vec<&ProcessAggregate> {
        let mut ranked: Vec<&ProcessAggregate> = self.entries.values().collect();
        ranked.sort_by(|a, b| {
            key.value(b)
                .partial_cmp(&key.value(a))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked.truncate(n);
        ranked
    }
}

/// Computes summaries with peak times shown in a secondary zone
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    secondary: DisplayZone,
}

impl Aggregator {
    pub fn new(secondary: DisplayZone) -> Self {
        Self { secondary }
    }

    pub fn secondary_zone(&self) -> &DisplayZone {
        &self.secondary
    }

    /// Averages and maxima over all records; `None` when there are none
    pub fn summarize(&self, records: &[SampleRecord]) -> Option<Summary> {
        Some(Summary {
            count: records.len(),
            secondary_zone: self.secondary.label.clone(),
            cpu: self.summarize_metric(records, Metric::Cpu)?,
            mem: self.summarize_metric(records, Metric::Mem)?,
            disk: self.summarize_metric(records, Metric::Disk)?,
        })
    }

    fn summarize_metric(&self, records: &[SampleRecord], metric: Metric) -> Option<MetricSummary> {
        let first = records.first()?;

        let mut peak = first;
        let mut total = 0.0;
        for record in records {
            let value = record.metric(metric);
            total += value;
            // Strict comparison keeps the earliest record on ties
            if value > peak.metric(metric) {
                peak = record;
            }
        }

        Some(MetricSummary {
            count: records.len(),
            average: total / records.len() as f64,
            maximum: peak.metric(metric),
            maximum_at_utc: peak.timestamp,
            maximum_at_secondary: self.secondary.localize(&peak.timestamp),
        })
    }

    /// Merge process snapshots by name across all records
    pub fn summarize_processes(&self, records: &[SampleRecord]) -> ProcessSummary {
        let mut sums: BTreeMap<String, (f64, f64, usize)> = BTreeMap::new();

        for snapshot in records.iter().flat_map(|r| r.processes.iter()) {
            let entry = sums.entry(snapshot.name.clone()).or_insert((0.0, 0.0, 0));
            entry.0 += snapshot.cpu;
            entry.1 += snapshot.mem;
            entry.2 += 1;
        }

        let entries = sums
            .into_iter()
            .map(|(name, (cpu, mem, count))| {
                let aggregate = ProcessAggregate {
                    name: name.clone(),
                    cpu_avg: cpu / count as f64,
                    mem_avg: mem / count as f64,
                    count,
                };
                (name, aggregate)
            })
            .collect();

        ProcessSummary { entries }
    }
}

fn serialize_utc<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.format("%Y-%m-%dT%H:%M:%S%:z").to_string())
}

fn serialize_local<S: Serializer>(
    timestamp: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.format("%Y-%m-%dT%H:%M:%S%:z").to_string())
}
