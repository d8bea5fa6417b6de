// src/monitor/mod.rs
mod collector;
mod io;
mod memory;
mod mysql;

pub use collector::Collector;
pub use io::{parse_diskstats, DiskSample, IoTracker};
pub use memory::parse_meminfo;
pub use mysql::collect_mysql_with;

use crate::probe::ProbeError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected line in {path}: {line:?}")]
    Parse { path: &'static str, line: String },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Monitor timed out after {0:?}")]
    Timeout(Duration),

    #[error("Monitor task failed: {0}")]
    Task(String),
}

async fn read_proc(path: &'static str) -> Result<String, MonitorError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MonitorError::Read { path, source })
}
