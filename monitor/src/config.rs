//! Configuration management for Hostwatch
//!
//! All defaults live here. Values are layered, lowest precedence first:
//! the caller's fallback (normally [`MonitorConfig::default`]), an optional
//! configuration file (YAML, TOML or JSON by extension), then `HOSTWATCH_*`
//! environment variables with `__` separating nested keys. The CLI applies
//! explicitly given flags on top of the loaded result.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::aggregate::DisplayZone;
use crate::alert::Thresholds;
use crate::error::{ConfigError, ConfigResult};
use crate::model::RankBy;

pub const DEFAULT_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_DURATION_SECS: u64 = 30;
pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_REPORT_TOP: usize = 10;
pub const DEFAULT_SECONDARY_OFFSET_HOURS: i32 = 9;
pub const DEFAULT_SECONDARY_LABEL: &str = "KST";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "HOSTWATCH";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Collection settings, stored at the top level of the file
    #[serde(flatten)]
    pub collector: CollectorSettings,

    /// Report settings, stored under `report`
    #[serde(default)]
    pub report: ReportSettings,
}

/// Settings for the sampling loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    /// Seconds between ticks
    pub interval: u64,

    /// Total run time in seconds
    pub duration: u64,

    /// Directory holding the daily logs
    pub out_dir: PathBuf,

    pub cpu_threshold: f64,
    pub mem_threshold: f64,
    pub disk_threshold: f64,

    /// Processes kept per sample; 0 disables process enumeration
    pub top_n: usize,

    /// Ranking key for the process snapshot
    pub top_by: RankBy,

    /// Mount point whose usage is reported as `disk_percent`
    pub mount: PathBuf,
}

/// Which zone the requested line chart is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneChoice {
    Utc,
    #[default]
    #[serde(alias = "kst")]
    Secondary,
}

/// Settings for the report pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Directory the daily logs are read from
    pub in_dir: PathBuf,

    /// Directory charts are written to
    pub out_dir: PathBuf,

    /// Zone of the primary line chart
    pub tz: ZoneChoice,

    /// Number of processes in the ranked tables and bar charts
    pub top: usize,

    /// Offset of the secondary display zone, in whole hours east of UTC
    pub secondary_offset_hours: i32,

    pub secondary_label: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            collector: CollectorSettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            interval: DEFAULT_INTERVAL_SECS,
            duration: DEFAULT_DURATION_SECS,
            out_dir: PathBuf::from("output"),
            cpu_threshold: thresholds.cpu,
            mem_threshold: thresholds.mem,
            disk_threshold: thresholds.disk,
            top_n: DEFAULT_TOP_N,
            top_by: RankBy::Cpu,
            mount: PathBuf::from("/"),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            in_dir: PathBuf::from("output"),
            out_dir: PathBuf::from("reports"),
            tz: ZoneChoice::Secondary,
            top: DEFAULT_REPORT_TOP,
            secondary_offset_hours: DEFAULT_SECONDARY_OFFSET_HOURS,
            secondary_label: DEFAULT_SECONDARY_LABEL.to_string(),
        }
    }
}

impl CollectorSettings {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            cpu: self.cpu_threshold,
            mem: self.mem_threshold,
            disk: self.disk_threshold,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "interval".to_string(),
                value: "0 (must be greater than 0)".to_string(),
            });
        }

        for (field, value) in [
            ("cpu_threshold", self.cpu_threshold),
            ("mem_threshold", self.mem_threshold),
            ("disk_threshold", self.disk_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ReportSettings {
    /// Fixed offset of the secondary display zone
    pub fn secondary_offset(&self) -> ConfigResult<FixedOffset> {
        self.secondary_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "report.secondary_offset_hours".to_string(),
                value: self.secondary_offset_hours.to_string(),
            })
    }

    pub fn secondary_zone(&self) -> ConfigResult<DisplayZone> {
        Ok(DisplayZone::new(self.secondary_label.clone(), self.secondary_offset()?))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.secondary_offset()?;

        // The label names the secondary chart file
        let label = self.secondary_label.trim();
        if label.is_empty()
            || label.contains(['/', '\\'])
            || label == "."
            || label == ".."
            || label.eq_ignore_ascii_case("utc")
        {
            return Err(ConfigError::InvalidValue {
                field: "report.secondary_label".to_string(),
                value: self.secondary_label.clone(),
            });
        }

        Ok(())
    }
}

impl MonitorConfig {
    /// Load configuration, using `fallback` for every key no source sets.
    ///
    /// A path that was given but does not exist is an error; pass `None` to
    /// skip the file layer.
    pub fn load(path: Option<&Path>, fallback: &MonitorConfig) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        let c = &fallback.collector;
        builder = builder
            .set_default("interval", c.interval)?
            .set_default("duration", c.duration)?
            .set_default("out_dir", c.out_dir.to_string_lossy().to_string())?
            .set_default("cpu_threshold", c.cpu_threshold)?
            .set_default("mem_threshold", c.mem_threshold)?
            .set_default("disk_threshold", c.disk_threshold)?
            .set_default("top_n", c.top_n as u64)?
            .set_default("top_by", c.top_by.to_string())?
            .set_default("mount", c.mount.to_string_lossy().to_string())?;

        let r = &fallback.report;
        builder = builder
            .set_default("report.in_dir", r.in_dir.to_string_lossy().to_string())?
            .set_default("report.out_dir", r.out_dir.to_string_lossy().to_string())?
            .set_default("report.tz", zone_choice_key(r.tz))?
            .set_default("report.top", r.top as u64)?
            .set_default("report.secondary_offset_hours", r.secondary_offset_hours as i64)?
            .set_default("report.secondary_label", r.secondary_label.clone())?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            tracing::debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        let collector: CollectorSettings = settings.clone().try_deserialize()?;
        let report: ReportSettings = settings.get("report")?;

        let config = MonitorConfig { collector, report };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.collector.validate()?;
        self.report.validate()?;
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Load {
            reason: e.to_string(),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = self.to_toml()?;
        fs::write(path.as_ref(), content).map_err(|e| ConfigError::Load {
            reason: format!("cannot write {}: {}", path.as_ref().display(), e),
        })
    }
}

fn zone_choice_key(choice: ZoneChoice) -> &'static str {
    match choice {
        ZoneChoice::Utc => "utc",
        ZoneChoice::Secondary => "secondary",
    }
}
