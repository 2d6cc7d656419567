//! Sample records as they are written to and read from the daily log

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Name recorded when a process name cannot be read
pub const UNKNOWN_PROCESS: &str = "unknown";

/// One timestamped snapshot of system utilization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// UTC, whole seconds, written with a trailing `Z`
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,

    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub disk_percent: f64,

    /// Top processes, already ranked and truncated
    #[serde(default)]
    pub processes: Vec<ProcessSnapshot>,
}

impl SampleRecord {
    /// Create a record, truncating the timestamp to whole seconds
    pub fn new(
        timestamp: DateTime<Utc>,
        cpu_percent: f64,
        mem_percent: f64,
        disk_percent: f64,
        processes: Vec<ProcessSnapshot>,
    ) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            cpu_percent,
            mem_percent,
            disk_percent,
            processes,
        }
    }

    /// Value of one of the three system metrics
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpu => self.cpu_percent,
            Metric::Mem => self.mem_percent,
            Metric::Disk => self.disk_percent,
        }
    }
}

/// Per-process usage captured within a sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub pid: u32,

    #[serde(default = "unknown_name", deserialize_with = "name_or_unknown")]
    pub name: String,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub cpu: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub mem: f64,
}

impl ProcessSnapshot {
    pub fn value(&self, key: RankBy) -> f64 {
        match key {
            RankBy::Cpu => self.cpu,
            RankBy::Mem => self.mem,
        }
    }
}

fn unknown_name() -> String {
    UNKNOWN_PROCESS.to_string()
}

fn name_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(unknown_name))
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or(0.0))
}

/// The three system-level metrics of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cpu,
    Mem,
    Disk,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::Mem, Metric::Disk];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU",
            Metric::Mem => "MEM",
            Metric::Disk => "DISK",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Key used to order processes before truncation to top-N
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    #[default]
    Cpu,
    Mem,
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankBy::Cpu => write!(f, "cpu"),
            RankBy::Mem => write!(f, "mem"),
        }
    }
}

impl FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpu" => Ok(RankBy::Cpu),
            "mem" | "memory" => Ok(RankBy::Mem),
            _ => Err(format!("Unknown ranking key: {}", s)),
        }
    }
}

/// Parse a stored timestamp.
///
/// Accepts the canonical `2024-01-01T00:00:00Z`, the same without `Z`
/// (read as UTC), fractional seconds, and full RFC 3339 offsets.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = value.trim();
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(parsed.and_utc());
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Canonical wire form of a timestamp
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

mod timestamp_format {
    use super::*;

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
