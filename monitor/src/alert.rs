//! Threshold alerting

use serde::{Deserialize, Serialize};

use crate::model::{Metric, SampleRecord};

/// Per-metric alert thresholds, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub cpu: f64,
    pub mem: f64,
    pub disk: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: 85.0,
            mem: 85.0,
            disk: 90.0,
        }
    }
}

impl Thresholds {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpu => self.cpu,
            Metric::Mem => self.mem,
            Metric::Disk => self.disk,
        }
    }
}

/// Outcome of checking one sample against the thresholds
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AlertVerdict {
    pub is_alert: bool,

    /// Metrics that exceeded their threshold, in cpu/mem/disk order
    pub breaches: Vec<Metric>,
}

/// Check a sample against the thresholds.
///
/// A metric breaches only when it is strictly greater than its threshold.
pub fn evaluate(record: &SampleRecord, thresholds: &Thresholds) -> AlertVerdict {
    let breaches: Vec<Metric> = Metric::ALL
        .into_iter()
        .filter(|&metric| record.metric(metric) > thresholds.get(metric))
        .collect();

    AlertVerdict {
        is_alert: !breaches.is_empty(),
        breaches,
    }
}
