//! Periodic collection loop
//!
//! Sample, evaluate, persist, sleep; repeated until the configured duration
//! has elapsed or shutdown is requested. The log file name is fixed when the
//! loop starts, so a run crossing UTC midnight keeps writing to the first day's
//! log.

use std::future::Future;
use std::path::PathBuf;

use tokio::time::Instant;

use crate::alert::{evaluate, AlertVerdict};
use crate::config::CollectorSettings;
use crate::error::ConfigResult;
use crate::model::SampleRecord;
use crate::provider::MetricsProvider;
use crate::sampler::MetricSampler;
use crate::store::SampleStore;

/// Where the loop currently is within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Sampling,
    Evaluating,
    Persisting,
    Sleeping,
}

/// Result of one tick, handed to the observer
#[derive(Debug, Clone)]
pub struct TickReport {
    pub record: SampleRecord,
    pub verdict: AlertVerdict,

    /// Log the record was appended to; `None` when the append failed
    pub path: Option<PathBuf>,
}

/// Totals for a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    /// Ticks attempted, including failed ones
    pub ticks: u64,

    /// Ticks whose sample breached a threshold
    pub alerts: u64,

    /// Ticks whose record could not be persisted
    pub failed_ticks: u64,

    pub log_path: PathBuf,
}

/// Drives sampling at a fixed interval
pub struct CollectionLoop {
    settings: CollectorSettings,
    sampler: MetricSampler,
    phase: LoopPhase,
}

impl CollectionLoop {
    /// Create a loop; fails if the settings do not validate
    pub fn new(settings: CollectorSettings) -> ConfigResult<Self> {
        settings.validate()?;
        let sampler = MetricSampler::new(settings.mount.clone());

        Ok(Self {
            settings,
            sampler,
            phase: LoopPhase::Idle,
        })
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Run for the configured duration
    pub async fn run<F>(&mut self, provider: &mut dyn MetricsProvider, observer: F) -> CollectionStats
    where
        F: FnMut(&TickReport),
    {
        self.run_until(provider, observer, std::future::pending::<()>())
            .await
    }

    /// Run for the configured duration or until `shutdown` completes.
    ///
    /// `shutdown` is only polled while sleeping between ticks; a tick in
    /// progress always finishes.
    pub async fn run_until<F, S>(
        &mut self,
        provider: &mut dyn MetricsProvider,
        mut observer: F,
        shutdown: S,
    ) -> CollectionStats
    where
        F: FnMut(&TickReport),
        S: Future,
    {
        let store = SampleStore::for_today(&self.settings.out_dir);
        let thresholds = self.settings.thresholds();
        let interval = self.settings.interval();
        let end = Instant::now() + self.settings.duration();

        let mut stats = CollectionStats {
            ticks: 0,
            alerts: 0,
            failed_ticks: 0,
            log_path: store.log_path(),
        };

        tracing::info!(
            interval_secs = self.settings.interval,
            duration_secs = self.settings.duration,
            log = %stats.log_path.display(),
            "Starting collection"
        );

        tokio::pin!(shutdown);

        while Instant::now() < end {
            self.phase = LoopPhase::Sampling;
            let record = self
                .sampler
                .sample(provider, self.settings.top_n, self.settings.top_by);

            self.phase = LoopPhase::Evaluating;
            let verdict = evaluate(&record, &thresholds);

            self.phase = LoopPhase::Persisting;
            let path = match store.append(&record) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::error!(category = e.category(), "Failed to persist sample: {}", e);
                    stats.failed_ticks += 1;
                    None
                }
            };

            stats.ticks += 1;
            if verdict.is_alert {
                stats.alerts += 1;
                tracing::warn!(
                    cpu = record.cpu_percent,
                    mem = record.mem_percent,
                    disk = record.disk_percent,
                    "Threshold exceeded: {:?}",
                    verdict.breaches
                );
            } else {
                tracing::info!(
                    cpu = record.cpu_percent,
                    mem = record.mem_percent,
                    disk = record.disk_percent,
                    "Sample collected"
                );
            }

            observer(&TickReport {
                record,
                verdict,
                path,
            });

            self.phase = LoopPhase::Sleeping;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping collection");
                    break;
                }
            }
        }

        self.phase = LoopPhase::Idle;
        tracing::info!(
            ticks = stats.ticks,
            alerts = stats.alerts,
            failed = stats.failed_ticks,
            "Collection finished"
        );

        stats
    }
}
