// src/agent/lifecycle.rs
use super::host::{os_description, HostFacts};
use super::state::AgentState;
use crate::api::{ApiClient, JsonObject};
use crate::config::AgentConfig;
use crate::fetch::{Method, ReqwestTransport, Transport};
use crate::monitor::Collector;
use crate::retry::RetryStrategy;
use anyhow::{anyhow, Context, Result};
use arc_swap::ArcSwap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

const AGENT_PATH: &str = "/api/v1/agent";
const METRIC_PATH: &str = "/api/v1/metric";

/// A configured agent: its state, its backend client and its monitors.
pub struct Agent<T: Transport = ReqwestTransport> {
    config: AgentConfig,
    state: Arc<ArcSwap<AgentState>>,
    api: ApiClient<T>,
    collector: Collector,
}

impl Agent<ReqwestTransport> {
    pub fn new(config: AgentConfig, state: AgentState) -> Self {
        Self::with_transport(config, state, ReqwestTransport)
    }
}

impl<T: Transport> Agent<T> {
    pub fn with_transport(config: AgentConfig, state: AgentState, transport: T) -> Self {
        let collector = Collector::with_io_samples(config.request_timeout(), state.io.clone());
        let state = Arc::new(ArcSwap::from_pointee(state));
        let api = ApiClient::with_transport(
            config.backend.clone(),
            RetryStrategy::new(config.retry.clone()),
            config.request_timeout(),
            state.clone(),
            transport,
        );

        Self {
            config,
            state,
            api,
            collector,
        }
    }

    pub fn state(&self) -> Arc<AgentState> {
        self.state.load_full()
    }

    pub fn registration_required(&self) -> bool {
        self.state.load().registration_required()
    }

    /// Register with the backend under `name` and persist the issued key.
    pub async fn register(&self, name: &str) -> Result<()> {
        info!("Registering agent {:?}", name);

        let mut payload = JsonObject::new();
        payload.insert(
            "token".to_string(),
            self.config
                .project_token
                .clone()
                .map_or(Value::Null, Value::String),
        );
        payload.insert("name".to_string(), Value::from(name));

        let reply = self
            .api
            .request(Method::Post, AGENT_PATH, payload)
            .await
            .context("Agent registration failed")?;

        let api_key = reply
            .get("apiKey")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Registration reply has no apiKey"))?;

        let state = AgentState {
            token: Some(api_key.to_string()),
            ..AgentState::clone(&self.state.load())
        };
        state.save(&self.config.state_file).await?;
        self.state.store(Arc::new(state));

        info!("Done registering");
        Ok(())
    }

    /// Register using the operating system description as the agent name.
    pub async fn register_with_host_name(&self) -> Result<()> {
        let name = os_description().await;
        self.register(&name).await
    }

    /// Tell the backend what this host looks like.
    pub async fn announce(&self, facts: &HostFacts) -> Result<()> {
        let mut payload = JsonObject::new();
        payload.insert("properties".to_string(), serde_json::to_value(facts)?);

        self.api
            .request(Method::Put, AGENT_PATH, payload)
            .await
            .context("Agent announcement failed")?;

        info!("Announced host {} to backend", facts.os);
        Ok(())
    }

    /// Collect every configured target once and push the results.
    /// Returns the number of metrics sent.
    pub async fn run_tracking_pass(&self) -> Result<usize> {
        let span = info_span!("tracking_pass", id = %Uuid::new_v4());

        async {
            if self.config.monitor.is_empty() {
                warn!("Nothing to track");
                return Ok(0);
            }

            info!("Run tracking iteration...");
            let metrics = self.collector.collect_all(&self.config.monitor).await;
            let count = metrics.len();
            self.save_io_samples().await;

            let mut payload = JsonObject::new();
            payload.insert(
                "metrics".to_string(),
                Value::Array(metrics.into_iter().map(Value::Object).collect()),
            );

            self.api
                .request(Method::Post, METRIC_PATH, payload)
                .await
                .context("Failed to push metrics")?;

            info!("Pushed {} metrics", count);
            Ok(count)
        }
        .instrument(span)
        .await
    }

    /// Persist the latest disk counters so the next run can report rates.
    /// A failed write only costs the next run its io rates.
    async fn save_io_samples(&self) {
        let samples = self.collector.io_samples();
        if samples.is_empty() {
            return;
        }

        let state = AgentState {
            io: samples,
            ..AgentState::clone(&self.state.load())
        };
        if let Err(e) = state.save(&self.config.state_file).await {
            warn!("Failed to save io samples: {:#}", e);
        }
        self.state.store(Arc::new(state));
    }
}
