// src/probe/status.rs
use super::driver::{MySqlDriver, StatusConnection, StatusDriver, StatusRow};
use std::fmt;
use tracing::{debug, warn};

/// Server-status introspection query for the global `Questions` counter.
/// The value is the first column of the only row.
pub const QUESTIONS_QUERY: &str = "SELECT VARIABLE_VALUE FROM performance_schema.global_status \
     WHERE VARIABLE_NAME = 'Questions'";

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Running total reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCounter(pub u64);

impl StatusCounter {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to initialise database client: {0}")]
    InitFailed(String),

    #[error("Failed to connect to database: {0}")]
    ConnectFailed(String),

    #[error("Status query failed: {0}")]
    QueryFailed(String),

    #[error("Malformed status result: {0}")]
    MalformedResult(String),
}

/// Read the `Questions` counter from the MySQL server described by `creds`.
pub async fn query_questions_counter(
    creds: &DatabaseCredentials,
) -> Result<StatusCounter, ProbeError> {
    query_questions_counter_with(&MySqlDriver, creds).await
}

/// Read the `Questions` counter through `driver`.
///
/// Once connected, the connection is closed exactly once before returning,
/// whether the query succeeds, fails or yields something unparsable.
pub async fn query_questions_counter_with<D: StatusDriver>(
    driver: &D,
    creds: &DatabaseCredentials,
) -> Result<StatusCounter, ProbeError> {
    let options = driver.init(creds).map_err(|reason| {
        warn!("Failed to init database client for {}: {}", creds.host, reason);
        ProbeError::InitFailed(reason)
    })?;

    let mut conn = driver.connect(options).await.map_err(|reason| {
        warn!("Failed to connect to {} as {}: {}", creds.host, creds.user, reason);
        ProbeError::ConnectFailed(reason)
    })?;

    let rows = conn.fetch_rows(QUESTIONS_QUERY).await;
    conn.close().await;

    let rows = rows.map_err(|reason| {
        warn!("Status query on {} failed: {}", creds.host, reason);
        ProbeError::QueryFailed(reason)
    })?;

    let counter = parse_counter(&rows)?;
    debug!("{} reports Questions = {}", creds.host, counter.value());
    Ok(counter)
}

fn parse_counter(rows: &[StatusRow]) -> Result<StatusCounter, ProbeError> {
    let cell = rows
        .first()
        .and_then(|row| row.first())
        .ok_or_else(|| ProbeError::MalformedResult("empty result set".to_string()))?;

    let text = cell
        .as_deref()
        .ok_or_else(|| ProbeError::MalformedResult("NULL value".to_string()))?;

    text.trim()
        .parse::<u64>()
        .map(StatusCounter)
        .map_err(|_| ProbeError::MalformedResult(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(cells: &[Option<&str>]) -> Vec<StatusRow> {
        vec![cells.iter().map(|c| c.map(str::to_string)).collect()]
    }

    #[test]
    fn test_parse_numeric_text() {
        assert_eq!(parse_counter(&rows(&[Some("418")])), Ok(StatusCounter(418)));
        assert_eq!(parse_counter(&rows(&[Some(" 7\n")])), Ok(StatusCounter(7)));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(
            parse_counter(&rows(&[Some("abc")])),
            Err(ProbeError::MalformedResult("abc".to_string()))
        );
        assert!(matches!(
            parse_counter(&rows(&[Some("-3")])),
            Err(ProbeError::MalformedResult(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_cells() {
        assert!(matches!(parse_counter(&[]), Err(ProbeError::MalformedResult(_))));
        assert!(matches!(
            parse_counter(&rows(&[None])),
            Err(ProbeError::MalformedResult(_))
        ));
        assert!(matches!(
            parse_counter(&[Vec::new()]),
            Err(ProbeError::MalformedResult(_))
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = DatabaseCredentials {
            host: "db".into(),
            user: "monitor".into(),
            password: "hunter2".into(),
            database: "".into(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
