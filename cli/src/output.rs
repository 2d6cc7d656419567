use console::style;
use hostwatch_monitor::collection::TickReport;
use hostwatch_monitor::model::format_timestamp;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

pub struct OutputManager {
    format: OutputFormat,
    colored: bool,
}

impl OutputManager {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self {
            format,
            colored,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn with_format(self, format: OutputFormat) -> Self {
        Self { format, ..self }
    }

    /// Status line for one collection tick
    pub fn print_tick(&self, tick: &TickReport) {
        let record = &tick.record;
        let line = format!(
            "{} cpu={:.1}% mem={:.1}% disk={:.1}% processes={}",
            format_timestamp(&record.timestamp),
            record.cpu_percent,
            record.mem_percent,
            record.disk_percent,
            record.processes.len()
        );

        if tick.verdict.is_alert {
            let breached: Vec<&str> = tick.verdict.breaches.iter().map(|m| m.label()).collect();
            let tag = format!("[ALERT {}]", breached.join(","));
            if self.colored {
                self.write_line(&format!("{} {}", style(tag).red().bold(), line));
            } else {
                self.write_line(&format!("{} {}", tag, line));
            }
        } else if self.colored {
            self.write_line(&format!("{} {}", style("[OK]").green(), line));
        } else {
            self.write_line(&format!("[OK] {}", line));
        }
    }

    pub fn print_text(&self, text: &str) {
        self.write_line(text.trim_end_matches('\n'));
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        self.write_line(&serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn print_success(&self, message: &str) {
        if self.colored {
            self.write_line(&format!("{} {}", style("✓").green().bold(), message));
        } else {
            self.write_line(&format!("✓ {}", message));
        }
    }

    pub fn print_warning(&self, message: &str) {
        if self.colored {
            self.write_line(&format!("{} {}", style("⚠").yellow().bold(), message));
        } else {
            self.write_line(&format!("⚠ {}", message));
        }
    }

    pub fn print_info(&self, message: &str) {
        if self.colored {
            self.write_line(&format!("{} {}", style("ℹ").blue().bold(), message));
        } else {
            self.write_line(&format!("ℹ {}", message));
        }
    }

    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}
