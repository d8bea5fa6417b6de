// src/agent/state.rs
use crate::monitor::DiskSample;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// What the agent remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default)]
    pub token: Option<String>,

    /// Last disk counters per device, so io rates span separate runs.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub io: HashMap<String, DiskSample>,
}

impl AgentState {
    /// Load state from `path`. A missing file is a fresh, unregistered agent.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {}, starting fresh", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Cannot open state file {}", path.display()))
            }
        };

        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse state file {}", path.display()))
    }

    /// Parse state, ignoring anything outside the outermost `{...}`.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let object = match (contents.find('{'), contents.rfind('}')) {
            (Some(start), Some(end)) if start < end => &contents[start..=end],
            _ => contents,
        };
        serde_json::from_str(object)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string(self)?;
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("Cannot write state file {}", path.display()))
    }

    pub fn registration_required(&self) -> bool {
        self.token.is_none()
    }
}
