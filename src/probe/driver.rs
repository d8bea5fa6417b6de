// src/probe/driver.rs
use super::status::DatabaseCredentials;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Row};
use tracing::warn;

/// One materialized result row, every column as text.
pub type StatusRow = Vec<Option<String>>;

#[async_trait]
pub trait StatusConnection: Send {
    /// Run `query` and materialize the whole result set.
    async fn fetch_rows(&mut self, query: &'static str) -> Result<Vec<StatusRow>, String>;

    /// Close the connection. Consumes the handle so it cannot be closed twice.
    async fn close(self);
}

#[async_trait]
pub trait StatusDriver: Send + Sync {
    type Options: Send;
    type Connection: StatusConnection;

    /// Prepare a client for `creds` without touching the network.
    fn init(&self, creds: &DatabaseCredentials) -> Result<Self::Options, String>;

    async fn connect(&self, options: Self::Options) -> Result<Self::Connection, String>;
}

/// MySQL driver on top of `sqlx`, connecting to the server's default port.
/// An empty host means the local server.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDriver;

#[async_trait]
impl StatusDriver for MySqlDriver {
    type Options = MySqlConnectOptions;
    type Connection = MySqlStatusConnection;

    fn init(&self, creds: &DatabaseCredentials) -> Result<Self::Options, String> {
        let mut options = MySqlConnectOptions::new()
            .username(&creds.user)
            .password(&creds.password);
        if !creds.host.is_empty() {
            options = options.host(&creds.host);
        }
        if !creds.database.is_empty() {
            options = options.database(&creds.database);
        }

        Ok(options)
    }

    async fn connect(&self, options: Self::Options) -> Result<Self::Connection, String> {
        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| e.to_string())?;

        Ok(MySqlStatusConnection { conn })
    }
}

pub struct MySqlStatusConnection {
    conn: MySqlConnection,
}

#[async_trait]
impl StatusConnection for MySqlStatusConnection {
    async fn fetch_rows(&mut self, query: &'static str) -> Result<Vec<StatusRow>, String> {
        let rows = sqlx::query(query)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| e.to_string())?;

        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|index| row.try_get::<Option<String>, _>(index))
                    .collect::<Result<StatusRow, _>>()
                    .map_err(|e| e.to_string())
            })
            .collect()
    }

    async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!("Error while closing MySQL connection: {}", e);
        }
    }
}
