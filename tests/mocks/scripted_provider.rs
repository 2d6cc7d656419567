use std::path::{Path, PathBuf};

use hostwatch_monitor::error::{ProviderError, Result};
use hostwatch_monitor::provider::{MetricsProvider, ProcessReading};

/// One refresh worth of readings
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedReading {
    pub cpu: f64,
    pub mem: f64,

    /// `None` makes `disk_percent` fail for this step
    pub disk: Option<f64>,

    pub processes: Vec<ProcessReading>,
}

impl ScriptedReading {
    pub fn new(cpu: f64, mem: f64, disk: f64) -> Self {
        Self {
            cpu,
            mem,
            disk: Some(disk),
            processes: Vec::new(),
        }
    }

    pub fn with_process(mut self, pid: u32, name: &str, cpu: f64, mem: f64) -> Self {
        self.processes.push(ProcessReading {
            pid,
            name: Some(name.to_string()),
            cpu: Some(cpu),
            mem: Some(mem),
        });
        self
    }

    pub fn without_disk(mut self) -> Self {
        self.disk = None;
        self
    }
}

/// Provider that replays a fixed script, one step per refresh.
///
/// After the last step the final readings repeat.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    steps: Vec<ScriptedReading>,
    position: Option<usize>,
    refreshes: usize,
    process_refreshes: usize,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<ScriptedReading>) -> Self {
        Self {
            steps,
            position: None,
            refreshes: 0,
            process_refreshes: 0,
        }
    }

    /// Script with the given cpu values and constant mem/disk
    pub fn from_cpu(values: &[f64]) -> Self {
        Self::new(values.iter().map(|&cpu| ScriptedReading::new(cpu, 50.0, 60.0)).collect())
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }

    pub fn process_refreshes(&self) -> usize {
        self.process_refreshes
    }

    fn current(&self) -> Option<&ScriptedReading> {
        self.position.and_then(|i| self.steps.get(i))
    }
}

impl MetricsProvider for ScriptedProvider {
    fn refresh(&mut self, include_processes: bool) {
        self.refreshes += 1;
        if include_processes {
            self.process_refreshes += 1;
        }

        let last = self.steps.len().saturating_sub(1);
        self.position = Some(match self.position {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
    }

    fn cpu_percent(&self) -> f64 {
        self.current().map(|s| s.cpu).unwrap_or(0.0)
    }

    fn virtual_memory_percent(&self) -> f64 {
        self.current().map(|s| s.mem).unwrap_or(0.0)
    }

    fn disk_percent(&self, mount: &Path) -> Result<f64> {
        self.current().and_then(|s| s.disk).ok_or_else(|| {
            ProviderError::MountNotFound {
                mount: PathBuf::from(mount),
            }
            .into()
        })
    }

    fn list_processes(&self) -> Vec<ProcessReading> {
        self.current().map(|s| s.processes.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_advances_and_repeats_last_step() {
        let mut provider = ScriptedProvider::from_cpu(&[1.0, 2.0]);
        assert_eq!(provider.cpu_percent(), 0.0);

        provider.refresh(false);
        assert_eq!(provider.cpu_percent(), 1.0);
        provider.refresh(true);
        assert_eq!(provider.cpu_percent(), 2.0);
        provider.refresh(false);
        assert_eq!(provider.cpu_percent(), 2.0);

        assert_eq!(provider.refreshes(), 3);
        assert_eq!(provider.process_refreshes(), 1);
    }

    #[test]
    fn test_missing_disk_is_an_error() {
        let mut provider = ScriptedProvider::new(vec![ScriptedReading::new(1.0, 2.0, 3.0).without_disk()]);
        provider.refresh(false);
        assert!(provider.disk_percent(Path::new("/")).is_err());
    }
}
