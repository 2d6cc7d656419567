//! Hostwatch monitor library
//!
//! Samples CPU, memory and disk utilization at a fixed interval, appends each
//! sample to a daily JSON-lines log, flags threshold breaches, and turns a
//! day's log into summaries and SVG charts.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod sampler;
pub mod alert;
pub mod store;
pub mod collection;

// Reporting
pub mod reader;
pub mod aggregate;
pub mod report;

// Re-export commonly used types
pub use config::{CollectorSettings, MonitorConfig, ReportSettings, ZoneChoice};
pub use error::{MonitorError, Result};
pub use model::{Metric, ProcessSnapshot, RankBy, SampleRecord};
pub use provider::{MetricsProvider, ProcessReading, SysinfoProvider};
pub use sampler::MetricSampler;
pub use alert::{evaluate, AlertVerdict, Thresholds};
pub use store::SampleStore;
pub use collection::{CollectionLoop, CollectionStats, LoopPhase, TickReport};
pub use reader::{read_all, RecordReader};
pub use aggregate::{Aggregator, DisplayZone, ProcessAggregate, ProcessKey, ProcessSummary, Summary};
pub use report::{RenderOutcome, ReportArtifacts, ReportJob, ReportOutcome, ReportRenderer, UsageSeries};
