use std::path::PathBuf;

use clap::Args;
use hostwatch_monitor::collection::CollectionLoop;
use hostwatch_monitor::config::CollectorSettings;
use hostwatch_monitor::model::RankBy;
use hostwatch_monitor::provider::SysinfoProvider;

use crate::error::Result;
use crate::output::OutputManager;

#[derive(Args, Debug, Default)]
pub struct CollectArgs {
    /// Seconds between samples
    #[arg(long)]
    pub interval: Option<u64>,

    /// Total run time in seconds (0 collects nothing)
    #[arg(long)]
    pub duration: Option<u64>,

    /// Directory for the daily metrics-YYYYMMDD.jsonl log
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Processes recorded per sample (0 disables the process snapshot)
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Ranking key for the process snapshot (cpu or mem)
    #[arg(long)]
    pub top_by: Option<RankBy>,

    /// CPU alert threshold in percent
    #[arg(long)]
    pub cpu_threshold: Option<f64>,

    /// Memory alert threshold in percent
    #[arg(long)]
    pub mem_threshold: Option<f64>,

    /// Disk alert threshold in percent
    #[arg(long)]
    pub disk_threshold: Option<f64>,

    /// Mount point whose usage is sampled
    #[arg(long)]
    pub mount: Option<PathBuf>,
}

impl CollectArgs {
    /// Overlay flags that were given on the command line
    pub fn apply(&self, settings: &mut CollectorSettings) {
        if let Some(interval) = self.interval {
            settings.interval = interval;
        }
        if let Some(duration) = self.duration {
            settings.duration = duration;
        }
        if let Some(out_dir) = &self.out_dir {
            settings.out_dir = out_dir.clone();
        }
        if let Some(top_n) = self.top_n {
            settings.top_n = top_n;
        }
        if let Some(top_by) = self.top_by {
            settings.top_by = top_by;
        }
        if let Some(cpu) = self.cpu_threshold {
            settings.cpu_threshold = cpu;
        }
        if let Some(mem) = self.mem_threshold {
            settings.mem_threshold = mem;
        }
        if let Some(disk) = self.disk_threshold {
            settings.disk_threshold = disk;
        }
        if let Some(mount) = &self.mount {
            settings.mount = mount.clone();
        }
    }
}

pub async fn run(args: CollectArgs, mut settings: CollectorSettings, output: OutputManager) -> Result<()> {
    args.apply(&mut settings);

    let mut collection = CollectionLoop::new(settings)?;
    let settings = collection.settings();
    output.print_info(&format!(
        "Collecting every {}s for {}s into {}",
        settings.interval,
        settings.duration,
        settings.out_dir.display()
    ));

    let mut provider = SysinfoProvider::new();
    let stats = collection
        .run_until(&mut provider, |tick| output.print_tick(tick), shutdown_signal())
        .await;

    if stats.ticks == 0 {
        output.print_info("No samples collected");
        return Ok(());
    }

    if stats.failed_ticks > 0 {
        output.print_warning(&format!(
            "{} of {} samples could not be written",
            stats.failed_ticks, stats.ticks
        ));
    }
    output.print_success(&format!(
        "{} samples ({} alerts) written to {}",
        stats.ticks - stats.failed_ticks,
        stats.alerts,
        stats.log_path.display()
    ));

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
