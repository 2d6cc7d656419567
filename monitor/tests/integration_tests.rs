//! Integration tests for the Hostwatch monitor library

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use hostwatch_monitor::{
    aggregate::{Aggregator, ProcessKey},
    alert::{evaluate, Thresholds},
    collection::CollectionLoop,
    config::CollectorSettings,
    error::Result,
    model::{ProcessSnapshot, RankBy, SampleRecord},
    provider::{MetricsProvider, ProcessReading},
    reader::read_all,
    report::{ReportJob, ReportOutcome},
    store::SampleStore,
    ReportSettings,
};

/// Provider that cycles through fixed cpu readings
struct CyclingProvider {
    cpu: Vec<f64>,
    next: usize,
    processes: Vec<ProcessReading>,
}

impl CyclingProvider {
    fn new(cpu: Vec<f64>) -> Self {
        Self {
            cpu,
            next: 0,
            processes: vec![
                ProcessReading {
                    pid: 1,
                    name: Some("init".to_string()),
                    cpu: Some(0.1),
                    mem: Some(0.5),
                },
                ProcessReading {
                    pid: 900,
                    name: Some("compiler".to_string()),
                    cpu: Some(75.0),
                    mem: Some(12.0),
                },
                ProcessReading {
                    pid: 901,
                    name: None,
                    cpu: Some(5.0),
                    mem: None,
                },
            ],
        }
    }
}

impl MetricsProvider for CyclingProvider {
    fn refresh(&mut self, _include_processes: bool) {
        self.next += 1;
    }

    fn cpu_percent(&self) -> f64 {
        self.cpu[(self.next - 1) % self.cpu.len()]
    }

    fn virtual_memory_percent(&self) -> f64 {
        48.0
    }

    fn disk_percent(&self, _mount: &Path) -> Result<f64> {
        Ok(61.5)
    }

    fn list_processes(&self) -> Vec<ProcessReading> {
        self.processes.clone()
    }
}

fn collector_settings(out_dir: &Path, top_n: usize) -> CollectorSettings {
    CollectorSettings {
        interval: 5,
        duration: 20,
        out_dir: out_dir.to_path_buf(),
        top_n,
        top_by: RankBy::Cpu,
        ..CollectorSettings::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_collected_records_read_back_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let mut collection = CollectionLoop::new(collector_settings(temp_dir.path(), 2)).unwrap();
    let mut provider = CyclingProvider::new(vec![10.0, 20.0, 30.0, 40.0]);

    let mut written = Vec::new();
    let stats = collection
        .run(&mut provider, |report| written.push(report.record.clone()))
        .await;

    assert_eq!(stats.ticks, 4);
    let records = read_all(&stats.log_path).unwrap();
    assert_eq!(records, written);

    let cpu: Vec<f64> = records.iter().map(|r| r.cpu_percent).collect();
    assert_eq!(cpu, vec![10.0, 20.0, 30.0, 40.0]);

    assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    for record in &records {
        assert_eq!(record.processes.len(), 2);
        assert_eq!(record.processes[0].name, "compiler");
        assert_eq!(record.processes[1].name, "unknown");
        assert_eq!(record.processes[1].mem, 0.0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_top_n_zero_writes_empty_process_lists() {
    let temp_dir = TempDir::new().unwrap();
    let mut collection = CollectionLoop::new(collector_settings(temp_dir.path(), 0)).unwrap();
    let mut provider = CyclingProvider::new(vec![10.0]);

    let stats = collection.run(&mut provider, |_| {}).await;

    let contents = fs::read_to_string(&stats.log_path).unwrap();
    assert!(contents.lines().all(|line| line.contains(r#""processes":[]"#)));
    assert!(read_all(&stats.log_path).unwrap().iter().all(|r| r.processes.is_empty()));
}

#[test]
fn test_zero_duration_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = collector_settings(temp_dir.path(), 5);
    settings.duration = 0;

    let mut collection = CollectionLoop::new(settings).unwrap();
    let mut provider = CyclingProvider::new(vec![10.0]);
    let stats = tokio_test::block_on(collection.run(&mut provider, |_| {}));

    assert_eq!(stats.ticks, 0);
    assert!(!stats.log_path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_alert_ticks_match_threshold_breaches() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = collector_settings(temp_dir.path(), 0);
    settings.cpu_threshold = 50.0;

    let mut collection = CollectionLoop::new(settings).unwrap();
    let mut provider = CyclingProvider::new(vec![10.0, 60.0, 50.0, 99.0]);

    let mut alerts = Vec::new();
    let stats = collection
        .run(&mut provider, |report| alerts.push(report.verdict.is_alert))
        .await;

    assert_eq!(alerts, vec![false, true, false, true]);
    assert_eq!(stats.alerts, 2);
}

#[test]
fn test_alert_on_cpu_only() {
    let record = SampleRecord::new(Utc::now(), 99.0, 50.0, 10.0, Vec::new());
    let thresholds = Thresholds {
        cpu: 85.0,
        mem: 85.0,
        disk: 90.0,
    };
    assert!(evaluate(&record, &thresholds).is_alert);
}

#[test]
fn test_summary_of_collected_day() {
    let temp_dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let store = SampleStore::new(temp_dir.path(), date);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    for (i, cpu) in [10.0, 95.0, 95.0, 20.0].into_iter().enumerate() {
        let processes = match i {
            0 => vec![ProcessSnapshot {
                pid: 10,
                name: "a".to_string(),
                cpu: 10.0,
                mem: 1.0,
            }],
            1 => vec![ProcessSnapshot {
                pid: 20,
                name: "a".to_string(),
                cpu: 30.0,
                mem: 3.0,
            }],
            _ => Vec::new(),
        };
        let record = SampleRecord::new(start + Duration::seconds(5 * i as i64), cpu, 40.0, 60.0, processes);
        store.append(&record).unwrap();
    }

    let records = read_all(store.log_path()).unwrap();
    let aggregator = Aggregator::default();

    let summary = aggregator.summarize(&records).unwrap();
    assert_eq!(summary.cpu.maximum, 95.0);
    assert_eq!(summary.cpu.maximum_at_utc, start + Duration::seconds(5));

    let processes = aggregator.summarize_processes(&records);
    let a = processes.get("a").unwrap();
    assert_eq!(a.cpu_avg, 20.0);
    assert_eq!(a.count, 2);
    assert_eq!(processes.top(ProcessKey::CpuAvg, 10).len(), 1);
}

#[test]
fn test_report_job_over_store_output() {
    let temp_dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let settings = ReportSettings {
        in_dir: temp_dir.path().join("output"),
        out_dir: temp_dir.path().join("reports"),
        ..ReportSettings::default()
    };

    let job = ReportJob::new(settings.clone());
    assert!(matches!(job.run(date).unwrap(), ReportOutcome::MissingLog(_)));

    let store = SampleStore::new(&settings.in_dir, date);
    let start = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 50).unwrap();
    for i in 0..2 {
        let record = SampleRecord::new(start + Duration::seconds(5 * i), 30.0, 40.0, 50.0, Vec::new());
        store.append(&record).unwrap();
    }

    match job.run(date).unwrap() {
        ReportOutcome::Rendered(artifacts) => {
            assert_eq!(artifacts.summary.count, 2);
            assert!(settings.out_dir.join("metrics-20240229-kst.svg").exists());
            assert!(settings.out_dir.join("metrics-20240229-utc.svg").exists());

            let json = serde_json::to_value(&*artifacts).unwrap();
            assert_eq!(json["summary"]["count"], 2);
            assert_eq!(json["date"], "2024-02-29");
        }
        other => panic!("expected rendered report, got {:?}", other),
    }
}

#[test]
fn test_malformed_log_stops_report() {
    let temp_dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let settings = ReportSettings {
        in_dir: temp_dir.path().to_path_buf(),
        out_dir: temp_dir.path().join("reports"),
        ..ReportSettings::default()
    };
    let store = SampleStore::new(&settings.in_dir, date);
    store
        .append(&SampleRecord::new(Utc::now(), 1.0, 2.0, 3.0, Vec::new()))
        .unwrap();
    fs::write(
        store.log_path(),
        format!("{}{{broken\n", fs::read_to_string(store.log_path()).unwrap()),
    )
    .unwrap();

    let err = ReportJob::new(settings).run(date).unwrap_err();
    assert_eq!(err.category(), "parse");
}
