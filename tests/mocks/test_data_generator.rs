use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hostwatch_monitor::model::{ProcessSnapshot, SampleRecord};
use hostwatch_monitor::store::SampleStore;

/// Generator for realistic sample records
pub struct SampleGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub start: DateTime<Utc>,
    pub interval_secs: i64,
    pub process_names: Vec<String>,
    pub processes_per_sample: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: crate::DEFAULT_SEED,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now),
            interval_secs: 5,
            process_names: ["postgres", "nginx", "rustc", "sshd", "systemd"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            processes_per_sample: 3,
        }
    }
}

impl SampleGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(GeneratorConfig {
            seed,
            ..GeneratorConfig::default()
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// `count` records with non-decreasing timestamps
    pub fn generate_records(&mut self, count: usize) -> Vec<SampleRecord> {
        (0..count).map(|i| self.generate_record(i)).collect()
    }

    fn generate_record(&mut self, index: usize) -> SampleRecord {
        let timestamp = self.config.start + Duration::seconds(self.config.interval_secs * index as i64);

        // Coarse values so ties in the maxima actually occur
        let cpu = self.rng.gen_range(0..=20) as f64 * 5.0;
        let mem = self.rng.gen_range(20.0..90.0);
        let disk = self.rng.gen_range(40.0..95.0);

        let processes = (0..self.config.processes_per_sample)
            .filter_map(|_| {
                if self.config.process_names.is_empty() {
                    return None;
                }
                let pick = self.rng.gen_range(0..self.config.process_names.len());
                Some(ProcessSnapshot {
                    pid: 1000 + pick as u32,
                    name: self.config.process_names[pick].clone(),
                    cpu: self.rng.gen_range(0.0..50.0),
                    mem: self.rng.gen_range(0.0..10.0),
                })
            })
            .collect();

        SampleRecord::new(timestamp, cpu, mem, disk, processes)
    }

    /// Append `count` generated records to the log for `date` under `dir`
    pub fn write_log(&mut self, dir: &Path, date: NaiveDate, count: usize) -> Result<(PathBuf, Vec<SampleRecord>)> {
        let store = SampleStore::new(dir, date);
        let records = self.generate_records(count);
        for record in &records {
            store.append(record)?;
        }
        Ok((store.log_path(), records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_records() {
        let a = SampleGenerator::with_seed(7).generate_records(20);
        let b = SampleGenerator::with_seed(7).generate_records(20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_records_are_in_range_and_ordered() {
        let records = SampleGenerator::with_seed(1).generate_records(50);
        assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        for record in &records {
            assert!((0.0..=100.0).contains(&record.cpu_percent));
            assert_eq!(record.processes.len(), 3);
        }
    }
}
