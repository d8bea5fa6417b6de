// src/monitor/io.rs
// https://www.kernel.org/doc/Documentation/iostats.txt
use super::{read_proc, MonitorError};
use crate::api::JsonObject;
use crate::clock::current_time_millis;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

const DISKSTATS: &str = "/proc/diskstats";

/// Linux always counts diskstats sectors in 512-byte units.
const SECTOR_SIZE: u64 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSample {
    pub sectors_read: u64,
    pub sectors_written: u64,
    pub timestamp_ms: i64,
}

/// Turns cumulative sector counters into per-second rates. Keeps the last
/// sample of every device between tracking passes; `snapshot` and
/// `from_samples` carry them across process runs.
#[derive(Debug, Default)]
pub struct IoTracker {
    previous: DashMap<String, DiskSample>,
}

impl IoTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: HashMap<String, DiskSample>) -> Self {
        Self {
            previous: samples.into_iter().collect(),
        }
    }

    pub fn snapshot(&self) -> HashMap<String, DiskSample> {
        self.previous
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub async fn collect(&self) -> Result<JsonObject, MonitorError> {
        let contents = read_proc(DISKSTATS).await?;
        self.observe(&contents, current_time_millis())
    }

    /// Record a `/proc/diskstats` reading taken at `timestamp_ms`.
    ///
    /// Devices seen for the first time only seed the tracker. The result is
    /// empty until at least one device has two samples.
    pub fn observe(&self, contents: &str, timestamp_ms: i64) -> Result<JsonObject, MonitorError> {
        let mut devices = Vec::new();

        for (name, sectors_read, sectors_written) in parse_diskstats(contents)? {
            if name.starts_with("loop") {
                continue;
            }

            let sample = DiskSample {
                sectors_read,
                sectors_written,
                timestamp_ms,
            };

            if let Some(previous) = self.previous.insert(name.to_string(), sample) {
                if let Some(rates) = rates(&previous, &sample) {
                    devices.push(json!({
                        "device": name,
                        "read": rates.0,
                        "write": rates.1,
                    }));
                }
            }
        }

        if devices.is_empty() {
            return Ok(JsonObject::new());
        }

        let mut result = JsonObject::new();
        result.insert("devices".to_string(), Value::Array(devices));
        Ok(result)
    }
}

/// Bytes read and written per second between two samples.
fn rates(previous: &DiskSample, current: &DiskSample) -> Option<(u64, u64)> {
    let elapsed_ms = current.timestamp_ms - previous.timestamp_ms;
    if elapsed_ms <= 0 {
        return None;
    }

    let per_second = |before: u64, after: u64| {
        after.saturating_sub(before) * SECTOR_SIZE * 1000 / elapsed_ms as u64
    };

    Some((
        per_second(previous.sectors_read, current.sectors_read),
        per_second(previous.sectors_written, current.sectors_written),
    ))
}

/// `(device, sectors read, sectors written)` for every line of `/proc/diskstats`.
pub fn parse_diskstats(contents: &str) -> Result<Vec<(&str, u64, u64)>, MonitorError> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let counter = |index: usize| fields.get(index).and_then(|f| f.parse::<u64>().ok());

            match (fields.get(2), counter(5), counter(9)) {
                (Some(name), Some(read), Some(written)) => Ok((*name, read, written)),
                _ => Err(MonitorError::Parse {
                    path: DISKSTATS,
                    line: line.to_string(),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diskstats(sda_read: u64, sda_written: u64) -> String {
        format!(
            "   7       0 loop0 57 0 2102 12 0 0 0 0 0 28 12 0 0 0 0\n\
             \x20  8       0 sda 44215 1320 {} 21035 31220 22718 {} 81294 0 45620 102329 0 0 0 0\n",
            sda_read, sda_written
        )
    }

    #[test]
    fn test_parse_diskstats() {
        let stats = diskstats(100, 200);
        let parsed = parse_diskstats(&stats).unwrap();
        assert_eq!(parsed, vec![("loop0", 2102, 0), ("sda", 100, 200)]);
    }

    #[test]
    fn test_first_sample_only_seeds() {
        let tracker = IoTracker::new();
        assert!(tracker.observe(&diskstats(100, 200), 1_000).unwrap().is_empty());
    }

    #[test]
    fn test_rates_between_samples() {
        let tracker = IoTracker::new();
        tracker.observe(&diskstats(100, 200), 1_000).unwrap();

        let result = tracker.observe(&diskstats(300, 1200), 3_000).unwrap();

        assert_eq!(
            result["devices"],
            json!([{ "device": "sda", "read": 51_200, "write": 256_000 }])
        );
    }

    #[test]
    fn test_rates_carry_over_through_snapshot() {
        let first_run = IoTracker::new();
        assert!(first_run.observe(&diskstats(100, 200), 1_000).unwrap().is_empty());

        let samples = first_run.snapshot();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples["sda"].sectors_read, 100);

        let second_run = IoTracker::from_samples(samples);
        let result = second_run.observe(&diskstats(300, 1200), 3_000).unwrap();

        assert_eq!(
            result["devices"],
            json!([{ "device": "sda", "read": 51_200, "write": 256_000 }])
        );
        assert_eq!(second_run.snapshot()["sda"].timestamp_ms, 3_000);
    }

    #[test]
    fn test_same_timestamp_reports_nothing() {
        let tracker = IoTracker::new();
        tracker.observe(&diskstats(100, 200), 1_000).unwrap();
        assert!(tracker.observe(&diskstats(150, 250), 1_000).unwrap().is_empty());
    }

    #[test]
    fn test_short_line_is_rejected() {
        assert!(parse_diskstats("8 0 sda 1 2\n").is_err());
    }
}
