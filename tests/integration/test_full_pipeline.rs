//! End-to-end tests: collection loop -> daily log -> report pipeline

use std::fs::OpenOptions;
use std::io::Write;

use chrono::NaiveDate;
use tempfile::TempDir;

use hostwatch_monitor::{
    aggregate::{Aggregator, ProcessKey},
    collection::CollectionLoop,
    config::{CollectorSettings, ReportSettings, ZoneChoice},
    model::RankBy,
    reader::{read_all, RecordReader},
    report::{ReportJob, ReportOutcome},
};
use hostwatch_tests::{test_setup, SampleGenerator, ScriptedProvider, ScriptedReading, DEFAULT_SEED};

fn log_date(path: &std::path::Path) -> NaiveDate {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap();
    NaiveDate::parse_from_str(stem.trim_start_matches("metrics-"), "%Y%m%d").unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_collect_then_report() {
    test_setup!();
    let temp_dir = TempDir::new().unwrap();

    let settings = CollectorSettings {
        interval: 5,
        duration: 20,
        out_dir: temp_dir.path().join("output"),
        top_n: 2,
        top_by: RankBy::Cpu,
        ..CollectorSettings::default()
    };
    let mut provider = ScriptedProvider::new(vec![
        ScriptedReading::new(10.0, 50.0, 60.0).with_process(10, "worker", 30.0, 1.0),
        ScriptedReading::new(95.0, 50.0, 60.0).with_process(11, "worker", 10.0, 3.0),
        ScriptedReading::new(95.0, 50.0, 60.0)
            .with_process(12, "idle", 0.0, 0.5)
            .with_process(13, "db", 5.0, 8.0)
            .with_process(14, "cron", 1.0, 0.1),
        ScriptedReading::new(20.0, 50.0, 60.0).without_disk(),
    ]);

    let mut collection = CollectionLoop::new(settings).unwrap();
    let stats = collection.run(&mut provider, |_| {}).await;
    assert_eq!(stats.ticks, 4);
    assert_eq!(stats.alerts, 2);
    assert_eq!(provider.process_refreshes(), 4);

    let records = read_all(&stats.log_path).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3].disk_percent, 0.0);
    let names: Vec<&str> = records[2].processes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["db", "cron"]);

    let report_settings = ReportSettings {
        in_dir: temp_dir.path().join("output"),
        out_dir: temp_dir.path().join("reports"),
        tz: ZoneChoice::Utc,
        ..ReportSettings::default()
    };
    let artifacts = match ReportJob::new(report_settings).run(log_date(&stats.log_path)).unwrap() {
        ReportOutcome::Rendered(artifacts) => artifacts,
        other => panic!("expected rendered report, got {:?}", other),
    };

    assert_eq!(artifacts.summary.count, 4);
    assert_eq!(artifacts.summary.cpu.maximum, 95.0);
    assert_eq!(artifacts.summary.cpu.maximum_at_utc, records[1].timestamp);
    assert!((artifacts.summary.cpu.average - 55.0).abs() < 1e-9);
    assert!(artifacts.usage_charts[0].to_string_lossy().ends_with("-utc.svg"));

    let top = artifacts.top_processes.as_ref().unwrap();
    let worker = top.by_cpu.iter().find(|p| p.name == "worker").unwrap();
    assert_eq!(worker.count, 2);
    assert!((worker.cpu_avg - 20.0).abs() < 1e-9);
    assert_eq!(top.by_mem[0].name, "db");
}

#[test]
fn test_generated_log_round_trips_in_order() {
    test_setup!();
    let temp_dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let (path, written) = SampleGenerator::with_seed(DEFAULT_SEED)
        .write_log(temp_dir.path(), date, 120)
        .unwrap();

    assert_eq!(read_all(&path).unwrap(), written);
}

#[test]
fn test_summary_matches_direct_computation() {
    let records = SampleGenerator::with_seed(42).generate_records(500);
    let summary = Aggregator::default().summarize(&records).unwrap();

    let cpu: Vec<f64> = records.iter().map(|r| r.cpu_percent).collect();
    let mean = cpu.iter().sum::<f64>() / cpu.len() as f64;
    let max = cpu.iter().copied().fold(f64::MIN, f64::max);
    let first_max = cpu.iter().position(|&v| v == max).unwrap();

    assert_eq!(summary.count, 500);
    assert!((summary.cpu.average - mean).abs() < 1e-9);
    assert_eq!(summary.cpu.maximum, max);
    assert_eq!(summary.cpu.maximum_at_utc, records[first_max].timestamp);

    let processes = Aggregator::default().summarize_processes(&records);
    let total: usize = processes.iter().map(|p| p.count).sum();
    assert_eq!(total, records.iter().map(|r| r.processes.len()).sum::<usize>());

    let ranked = processes.top(ProcessKey::MemAvg, usize::MAX);
    assert!(ranked.windows(2).all(|w| w[0].mem_avg >= w[1].mem_avg));
}

#[test]
fn test_reader_ignores_lines_appended_after_open() {
    let temp_dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut generator = SampleGenerator::with_seed(3);
    let (path, _) = generator.write_log(temp_dir.path(), date, 3).unwrap();

    let reader = RecordReader::open(&path).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    for record in generator.generate_records(2) {
        writeln!(file, "{}", serde_json::to_string(&record).unwrap()).unwrap();
    }
    drop(file);

    assert_eq!(reader.count(), 3);
    assert_eq!(read_all(&path).unwrap().len(), 5);
}

#[test]
fn test_partial_trailing_line_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let (path, _) = SampleGenerator::with_seed(9).write_log(temp_dir.path(), date, 4).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{{\"timestamp\":\"2024-01-01T01:00:00Z\",\"cpu_").unwrap();
    drop(file);

    assert_eq!(read_all(&path).unwrap().len(), 4);
}
