// src/config/models.rs
use crate::probe::DatabaseCredentials;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default location of the persisted agent state.
pub const DEFAULT_STATE_FILE: &str = "/sm/state.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub backend: Url,

    #[serde(default)]
    pub project_token: Option<String>,

    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    #[serde(default)]
    pub monitor: Vec<MonitorTarget>,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.backend.scheme(), "http" | "https") {
            bail!("Backend URL must use http or https: {}", self.backend);
        }
        if self.request_timeout_secs == 0 {
            bail!("requestTimeoutSecs must be greater than zero");
        }
        self.retry.validate()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// One thing to watch, with an optional label for the reported metric.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorTarget {
    #[serde(default)]
    pub tag: Option<String>,

    #[serde(flatten)]
    pub kind: MonitorKind,
}

impl MonitorTarget {
    /// Reported tag, falling back to the monitor type.
    pub fn tag(&self) -> &str {
        self.tag.as_deref().unwrap_or_else(|| self.kind.type_name())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MonitorKind {
    Memory,
    Io,
    Mysql(MysqlTarget),
}

impl MonitorKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            MonitorKind::Memory => "memory",
            MonitorKind::Io => "io",
            MonitorKind::Mysql(_) => "mysql",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MysqlTarget {
    pub host: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
}

impl From<&MysqlTarget> for DatabaseCredentials {
    fn from(target: &MysqlTarget) -> Self {
        Self {
            host: target.host.clone(),
            user: target.user.clone(),
            password: target.password.clone(),
            database: target.database.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 5_000,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("retry.maxAttempts must be at least 1");
        }
        if self.backoff_base_ms > self.backoff_max_ms {
            bail!("retry.backoffBaseMs must not exceed retry.backoffMaxMs");
        }
        Ok(())
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}
