// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Default location of the agent configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/sm/config.json";

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<AgentConfig> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(path, &contents)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<AgentConfig> {
    let extension = path.extension().and_then(|s| s.to_str());

    let config = if extension == Some("yaml") || extension == Some("yml") {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JSON_CONFIG: &str = r#"{
        "backend": "https://monitor.example.com",
        "projectToken": "project-123",
        "monitor": [
            { "type": "memory" },
            { "type": "io", "tag": "disks" },
            { "type": "mysql", "host": "db", "user": "monitor", "password": "secret", "database": "app" }
        ]
    }"#;

    #[tokio::test]
    async fn test_load_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(JSON_CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).await.unwrap();

        assert_eq!(config.backend.as_str(), "https://monitor.example.com/");
        assert_eq!(config.project_token.as_deref(), Some("project-123"));
        assert_eq!(config.monitor.len(), 3);
        assert_eq!(config.monitor[1].tag(), "disks");
        assert_eq!(config.monitor[0].tag(), "memory");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.state_file, std::path::PathBuf::from(DEFAULT_STATE_FILE));

        match &config.monitor[2].kind {
            MonitorKind::Mysql(creds) => {
                assert_eq!(creds.host, "db");
                assert_eq!(creds.database, "app");
            }
            other => panic!("unexpected monitor kind {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_yaml_config() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "backend: http://localhost:8080\nmonitor:\n  - type: memory\nretry:\n  maxAttempts: 1\n  backoffBaseMs: 5\n  backoffMaxMs: 5\n"
        )
        .unwrap();

        let config = load_config(file.path()).await.unwrap();

        assert_eq!(config.project_token, None);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.request_timeout(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_monitor_type_is_rejected() {
        let contents = r#"{ "backend": "http://localhost", "monitor": [{ "type": "docker" }] }"#;
        assert!(parse_config(Path::new("config.json"), contents).is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        assert!(load_config("/nonexistent/config.json").await.is_err());
    }
}
