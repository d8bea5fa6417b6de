// src/monitor/collector.rs
use super::io::{DiskSample, IoTracker};
use super::memory::collect_memory;
use super::mysql::collect_mysql_with;
use super::MonitorError;
use crate::api::JsonObject;
use crate::clock::rfc3339_now;
use crate::config::{MonitorKind, MonitorTarget};
use crate::probe::MySqlDriver;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs every configured monitor target once.
///
/// Each target gets its own task and its own deadline; a target that fails,
/// hangs or reports nothing is left out of the pass without affecting the
/// others.
pub struct Collector {
    io: Arc<IoTracker>,
    deadline: Duration,
}

impl Collector {
    pub fn new(deadline: Duration) -> Self {
        Self::with_io_samples(deadline, HashMap::new())
    }

    /// Resume io tracking from samples recorded by an earlier run.
    pub fn with_io_samples(deadline: Duration, samples: HashMap<String, DiskSample>) -> Self {
        Self {
            io: Arc::new(IoTracker::from_samples(samples)),
            deadline,
        }
    }

    pub fn io_samples(&self) -> HashMap<String, DiskSample> {
        self.io.snapshot()
    }

    pub async fn collect_all(&self, targets: &[MonitorTarget]) -> Vec<JsonObject> {
        let tasks: Vec<_> = targets
            .iter()
            .cloned()
            .map(|target| {
                let io = self.io.clone();
                let deadline = self.deadline;
                tokio::spawn(async move {
                    let result = match timeout(deadline, collect_one(&target, &io)).await {
                        Ok(result) => result,
                        Err(_) => Err(MonitorError::Timeout(deadline)),
                    };
                    (target, result)
                })
            })
            .collect();

        let mut metrics = Vec::new();

        for joined in futures::future::join_all(tasks).await {
            let (target, result) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("{}", MonitorError::Task(e.to_string()));
                    continue;
                }
            };

            match result {
                Ok(data) if data.is_empty() => {
                    debug!("Monitor {} reported nothing this pass", target.tag());
                }
                Ok(data) => metrics.push(enrich(&target, data)),
                Err(e) => warn!("Monitor {} failed: {}", target.tag(), e),
            }
        }

        metrics
    }
}

async fn collect_one(target: &MonitorTarget, io: &IoTracker) -> Result<JsonObject, MonitorError> {
    match &target.kind {
        MonitorKind::Memory => collect_memory().await,
        MonitorKind::Io => io.collect().await,
        MonitorKind::Mysql(mysql) => collect_mysql_with(&MySqlDriver, mysql).await,
    }
}

fn enrich(target: &MonitorTarget, mut data: JsonObject) -> JsonObject {
    data.insert("type".to_string(), Value::from(target.kind.type_name()));
    data.insert("tag".to_string(), Value::from(target.tag()));
    data.insert("timestamp".to_string(), Value::from(rfc3339_now()));
    data
}
