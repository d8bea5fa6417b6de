// src/main.rs
use anyhow::Result;
use service_monitor_agent::{
    agent::{Agent, AgentState, HostFacts},
    config::{self, DEFAULT_CONFIG_PATH},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("service_monitor_agent=debug".parse()?)
                .add_directive("sqlx=warn".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let state = AgentState::load(&config.state_file).await?;
    let agent = Agent::new(config, state);

    if agent.registration_required() {
        agent.register_with_host_name().await?;
    }

    let facts = HostFacts::collect().await;
    agent.announce(&facts).await?;

    // Scheduling of further passes belongs to whatever runs the agent
    let pushed = agent.run_tracking_pass().await?;
    info!("Tracking pass finished, {} metrics pushed", pushed);

    Ok(())
}
