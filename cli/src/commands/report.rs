use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Args, ValueEnum};
use serde::Serialize;
use hostwatch_monitor::config::{ReportSettings, ZoneChoice};
use hostwatch_monitor::report::{ReportJob, ReportOutcome};

use crate::error::{CliError, Result};
use crate::output::{OutputFormat, OutputManager};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Day to report, YYYYMMDD (default: today in UTC)
    #[arg(long)]
    pub date: Option<String>,

    /// Directory holding the daily logs
    #[arg(long)]
    pub in_dir: Option<PathBuf>,

    /// Directory charts are written to
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Timezone of the primary line chart
    #[arg(long, value_enum)]
    pub tz: Option<TzArg>,

    /// Processes shown in the ranked tables and bar charts
    #[arg(long)]
    pub top: Option<usize>,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TzArg {
    Utc,
    #[value(alias = "kst")]
    Secondary,
}

impl From<TzArg> for ZoneChoice {
    fn from(arg: TzArg) -> Self {
        match arg {
            TzArg::Utc => ZoneChoice::Utc,
            TzArg::Secondary => ZoneChoice::Secondary,
        }
    }
}

/// JSON body for runs that had nothing to render
#[derive(Serialize, Debug)]
struct ReportStatus<'a> {
    status: &'static str,
    log_path: &'a Path,
}

impl ReportArgs {
    pub fn apply(&self, settings: &mut ReportSettings) {
        if let Some(in_dir) = &self.in_dir {
            settings.in_dir = in_dir.clone();
        }
        if let Some(out_dir) = &self.out_dir {
            settings.out_dir = out_dir.clone();
        }
        if let Some(tz) = self.tz {
            settings.tz = tz.into();
        }
        if let Some(top) = self.top {
            settings.top = top;
        }
    }

    pub fn date(&self) -> Result<NaiveDate> {
        match &self.date {
            Some(raw) => parse_date(raw),
            None => Ok(Utc::now().date_naive()),
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d")
        .map_err(|e| CliError::InvalidArgument(format!("date '{}' is not YYYYMMDD: {}", raw, e)))
}

pub fn run(args: ReportArgs, mut settings: ReportSettings, output: OutputManager) -> Result<()> {
    args.apply(&mut settings);
    settings.validate()?;
    let date = args.date()?;
    let output = output.with_format(args.format);

    match ReportJob::new(settings).run(date)? {
        ReportOutcome::MissingLog(path) => match output.format() {
            OutputFormat::Json => output.print_json(&ReportStatus {
                status: "missing_log",
                log_path: &path,
            })?,
            OutputFormat::Text => output.print_info(&format!("No input log: {}", path.display())),
        },
        ReportOutcome::NoData(path) => match output.format() {
            OutputFormat::Json => output.print_json(&ReportStatus {
                status: "no_data",
                log_path: &path,
            })?,
            OutputFormat::Text => output.print_info(&format!("No data in {}", path.display())),
        },
        ReportOutcome::Rendered(artifacts) => match output.format() {
            OutputFormat::Json => output.print_json(&*artifacts)?,
            OutputFormat::Text => {
                output.print_text(&artifacts.summary_text);
                if let Some((primary, rest)) = artifacts.usage_charts.split_first() {
                    output.print_info(&format!("Line chart saved: {}", primary.display()));
                    for path in rest {
                        output.print_info(&format!("Line chart (additional): {}", path.display()));
                    }
                }

                if artifacts.process_text.is_empty() {
                    output.print_info("No processes to report; skipping process summary and charts");
                } else {
                    for table in &artifacts.process_text {
                        output.print_text(table);
                    }
                    let charts: Vec<String> = artifacts
                        .process_charts
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect();
                    output.print_info(&format!("Process charts saved: {}", charts.join(", ")));
                }
            }
        },
    }

    Ok(())
}
