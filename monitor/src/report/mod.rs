//! Daily report generation
//!
//! [`ReportRenderer`] turns summaries into text and SVG charts. [`ReportJob`]
//! is the whole pipeline for one day: locate the log, read it, aggregate and
//! render.

pub mod charts;
pub mod text;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{Aggregator, DisplayZone, ProcessAggregate, ProcessKey, ProcessSummary, Summary};
use crate::config::{ReportSettings, ZoneChoice};
use crate::error::{Result, StorageError};
use crate::reader::read_all;
use crate::store::log_path_for;

pub use charts::{UsagePoint, UsageSeries};

/// Files written by a render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(Vec<PathBuf>),

    /// Input was empty; nothing was written
    NothingToRender,
}

impl RenderOutcome {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            RenderOutcome::Rendered(paths) => paths,
            RenderOutcome::NothingToRender => &[],
        }
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            RenderOutcome::Rendered(paths) => paths,
            RenderOutcome::NothingToRender => Vec::new(),
        }
    }
}

/// Renders report text and charts into an output directory
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    out_dir: PathBuf,
    top: usize,
}

impl ReportRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, top: usize) -> Self {
        Self {
            out_dir: out_dir.into(),
            top,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn render_summary(&self, summary: &Summary) -> String {
        text::summary_block(summary)
    }

    pub fn render_top_processes(&self, processes: &ProcessSummary, key: ProcessKey, n: usize) -> String {
        text::process_table(&processes.top(key, n), key, n)
    }

    /// One line chart per zone, written to `<out_dir>/<stem>-<zone>.svg`
    pub fn render_usage_charts(&self, stem: &str, series: &UsageSeries, zones: &[DisplayZone]) -> Result<RenderOutcome> {
        if series.is_empty() || zones.is_empty() {
            return Ok(RenderOutcome::NothingToRender);
        }
        self.ensure_out_dir()?;

        let mut paths = Vec::with_capacity(zones.len());
        for zone in zones {
            let path = self.out_dir.join(format!("{}-{}.svg", stem, zone.slug()));
            charts::draw_usage_chart(&path, series, zone)?;
            tracing::debug!(zone = %zone.label, "Wrote usage chart {}", path.display());
            paths.push(path);
        }

        Ok(RenderOutcome::Rendered(paths))
    }

    /// CPU and memory bar charts for the top processes of `date`
    pub fn render_process_charts(&self, processes: &ProcessSummary, date: &str) -> Result<RenderOutcome> {
        if processes.is_empty() || self.top == 0 {
            return Ok(RenderOutcome::NothingToRender);
        }
        self.ensure_out_dir()?;

        let mut paths = Vec::with_capacity(2);
        for (key, prefix) in [(ProcessKey::CpuAvg, "proc-top-cpu"), (ProcessKey::MemAvg, "proc-top-mem")] {
            let path = self.out_dir.join(format!("{}-{}.svg", prefix, date));
            charts::draw_process_bars(&path, &processes.top(key, self.top), key)?;
            tracing::debug!("Wrote process chart {}", path.display());
            paths.push(path);
        }

        Ok(RenderOutcome::Rendered(paths))
    }

    fn ensure_out_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.out_dir).map_err(|source| StorageError::DirectoryCreationFailed {
            path: self.out_dir.clone(),
            source,
        })?;
        Ok(())
    }
}

/// Processes ranked by each average
#[derive(Debug, Clone, Serialize)]
pub struct TopProcesses {
    pub by_cpu: Vec<ProcessAggregate>,
    pub by_mem: Vec<ProcessAggregate>,
}

/// Everything a successful report run produced
#[derive(Debug, Clone, Serialize)]
pub struct ReportArtifacts {
    pub date: NaiveDate,
    pub log_path: PathBuf,
    pub summary: Summary,

    /// `None` when no record carried process data
    pub top_processes: Option<TopProcesses>,

    /// Requested zone's chart first
    pub usage_charts: Vec<PathBuf>,
    pub process_charts: Vec<PathBuf>,

    #[serde(skip)]
    pub summary_text: String,
    #[serde(skip)]
    pub process_text: Vec<String>,
}

/// Result of a report run
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    /// No log exists for the date
    MissingLog(PathBuf),

    /// The log exists but holds no records
    NoData(PathBuf),

    Rendered(Box<ReportArtifacts>),
}

/// Report pipeline for one day
#[derive(Debug, Clone)]
pub struct ReportJob {
    settings: ReportSettings,
}

impl ReportJob {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Zones to chart, the requested one first
    pub fn chart_zones(&self) -> Result<Vec<DisplayZone>> {
        let utc = DisplayZone::utc();
        let secondary = self.settings.secondary_zone()?;

        Ok(match self.settings.tz {
            ZoneChoice::Utc => vec![utc, secondary],
            ZoneChoice::Secondary => vec![secondary, utc],
        })
    }

    pub fn run(&self, date: NaiveDate) -> Result<ReportOutcome> {
        let log_path = log_path_for(&self.settings.in_dir, date);
        if !log_path.exists() {
            tracing::info!("No log for {}: {}", date, log_path.display());
            return Ok(ReportOutcome::MissingLog(log_path));
        }

        let records = read_all(&log_path)?;
        let zones = self.chart_zones()?;
        let aggregator = Aggregator::new(self.settings.secondary_zone()?);

        let summary = match aggregator.summarize(&records) {
            Some(summary) => summary,
            None => {
                tracing::info!("Log {} holds no records", log_path.display());
                return Ok(ReportOutcome::NoData(log_path));
            }
        };

        tracing::info!(records = records.len(), "Building report for {}", date);

        let renderer = ReportRenderer::new(&self.settings.out_dir, self.settings.top);
        let summary_text = renderer.render_summary(&summary);

        let stem = log_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("metrics-{}", date.format("%Y%m%d")));
        let series = UsageSeries::from_records(&records);
        let usage_charts = renderer.render_usage_charts(&stem, &series, &zones)?.into_paths();

        let processes = aggregator.summarize_processes(&records);
        let (top_processes, process_text, process_charts) = if processes.is_empty() || self.settings.top == 0 {
            (None, Vec::new(), Vec::new())
        } else {
            let top = self.settings.top;
            let cloned = |key: ProcessKey| -> Vec<ProcessAggregate> {
                processes.top(key, top).into_iter().cloned().collect()
            };
            let text = vec![
                renderer.render_top_processes(&processes, ProcessKey::CpuAvg, top),
                renderer.render_top_processes(&processes, ProcessKey::MemAvg, top),
            ];
            let charts = renderer
                .render_process_charts(&processes, &date.format("%Y%m%d").to_string())?
                .into_paths();
            let top_processes = TopProcesses {
                by_cpu: cloned(ProcessKey::CpuAvg),
                by_mem: cloned(ProcessKey::MemAvg),
            };
            (Some(top_processes), text, charts)
        };

        Ok(ReportOutcome::Rendered(Box::new(ReportArtifacts {
            date,
            log_path,
            summary,
            top_processes,
            usage_charts,
            process_charts,
            summary_text,
            process_text,
        })))
    }
}
