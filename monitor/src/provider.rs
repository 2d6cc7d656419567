//! Operating system metrics provider
//!
//! The sampler talks to the OS only through [`MetricsProvider`]. System-wide
//! readings are assumed available; per-process fields may be missing, which
//! is why [`ProcessReading`] carries `Option`s.

use std::path::{Path, PathBuf};

use sysinfo::{Disks, System};

use crate::error::{ProviderError, Result};

/// One process as reported by the provider, before ranking
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReading {
    pub pid: u32,
    pub name: Option<String>,
    pub cpu: Option<f64>,
    pub mem: Option<f64>,
}

/// Source of instantaneous utilization readings
pub trait MetricsProvider {
    /// Refresh cached readings; called once at the start of every sample
    fn refresh(&mut self, include_processes: bool);

    /// Global CPU usage since the previous refresh, in percent
    fn cpu_percent(&self) -> f64;

    /// Used share of physical memory, in percent
    fn virtual_memory_percent(&self) -> f64;

    /// Used share of the filesystem holding `mount`, in percent
    fn disk_percent(&self, mount: &Path) -> Result<f64>;

    /// Running processes, in no particular order
    fn list_processes(&self) -> Vec<ProcessReading>;
}

/// [`MetricsProvider`] backed by `sysinfo`.
///
/// CPU usage is a delta between refreshes, so the same provider must be kept
/// across ticks; the first reading after construction is close to zero.
pub struct SysinfoProvider {
    system: System,
    disks: Disks,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        system.refresh_memory();
        system.refresh_processes();

        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoProvider {
    fn refresh(&mut self, include_processes: bool) {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        if include_processes {
            self.system.refresh_processes();
        }
        self.disks.refresh();
    }

    fn cpu_percent(&self) -> f64 {
        self.system.global_cpu_info().cpu_usage() as f64
    }

    fn virtual_memory_percent(&self) -> f64 {
        let total = self.system.total_memory();
        if total == 0 {
            return 0.0;
        }
        let used = total.saturating_sub(self.system.available_memory());
        used as f64 / total as f64 * 100.0
    }

    fn disk_percent(&self, mount: &Path) -> Result<f64> {
        // Longest mount point that is a prefix of the requested path
        let disk = self
            .disks
            .list()
            .iter()
            .filter(|disk| mount.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .ok_or_else(|| ProviderError::MountNotFound {
                mount: PathBuf::from(mount),
            })?;

        let total = disk.total_space();
        if total == 0 {
            return Err(ProviderError::MetricUnavailable {
                metric: format!("disk size of {}", disk.mount_point().display()),
            }
            .into());
        }

        let used = total.saturating_sub(disk.available_space());
        Ok(used as f64 / total as f64 * 100.0)
    }

    fn list_processes(&self) -> Vec<ProcessReading> {
        let total_memory = self.system.total_memory();

        self.system
            .processes()
            .values()
            .map(|process| {
                let name = process.name();
                ProcessReading {
                    pid: process.pid().as_u32(),
                    name: (!name.is_empty()).then(|| name.to_string()),
                    cpu: Some(process.cpu_usage() as f64),
                    mem: (total_memory > 0)
                        .then(|| process.memory() as f64 / total_memory as f64 * 100.0),
                }
            })
            .collect()
    }
}
