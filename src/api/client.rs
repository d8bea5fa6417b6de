// src/api/client.rs
use crate::agent::AgentState;
use crate::fetch::{fetch_with, Method, ReqwestTransport, RequestSpec, Transport, TransportError};
use crate::retry::{RetryDecision, RetryStrategy};
use arc_swap::ArcSwap;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

pub type JsonObject = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("API request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object from {path}, got: {body}")]
    NotAnObject { path: String, body: String },
}

impl ApiError {
    fn retry_decision(&self) -> RetryDecision {
        match self {
            ApiError::Transport(TransportError::RequestFailed(_)) | ApiError::Timeout(_) => {
                RetryDecision::Retry
            }
            _ => RetryDecision::NoRetry,
        }
    }
}

/// JSON client for the monitoring backend.
///
/// Every call goes through the HTTP fetcher, wrapped in the configured retry
/// strategy and a per-attempt timeout. The agent token is read from the
/// shared state at call time, so a token stored after registration is picked
/// up by the next request.
pub struct ApiClient<T: Transport = ReqwestTransport> {
    backend: Url,
    transport: T,
    retry: RetryStrategy,
    timeout: Duration,
    state: Arc<ArcSwap<AgentState>>,
}

impl ApiClient<ReqwestTransport> {
    pub fn new(
        backend: Url,
        retry: RetryStrategy,
        timeout: Duration,
        state: Arc<ArcSwap<AgentState>>,
    ) -> Self {
        Self::with_transport(backend, retry, timeout, state, ReqwestTransport)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(
        backend: Url,
        retry: RetryStrategy,
        timeout: Duration,
        state: Arc<ArcSwap<AgentState>>,
        transport: T,
    ) -> Self {
        Self {
            backend,
            transport,
            retry,
            timeout,
            state,
        }
    }

    /// Send `payload` as JSON to `path` and decode the JSON object reply.
    ///
    /// A `token` field holding the current agent token is added unless the
    /// payload already has one.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        mut payload: JsonObject,
    ) -> Result<JsonObject, ApiError> {
        if !payload.contains_key("token") {
            let token = self.state.load().token.clone();
            payload.insert("token".to_string(), token.map_or(Value::Null, Value::String));
        }

        let body = serde_json::to_string(&payload)?;
        let spec = RequestSpec::new(self.url_for(path), method, Some(body));
        debug!("API {} {}", method, path);

        let transport = &self.transport;
        let spec = &spec;
        let limit = self.timeout;

        let buffer = self
            .retry
            .execute_with_decision(
                move || async move {
                    match timeout(limit, fetch_with(transport, spec)).await {
                        Ok(result) => result.map_err(ApiError::from),
                        Err(_) => Err(ApiError::Timeout(limit)),
                    }
                },
                ApiError::retry_decision,
            )
            .await?;

        match serde_json::from_slice::<Value>(buffer.as_bytes())? {
            Value::Object(reply) => Ok(reply),
            other => Err(ApiError::NotAnObject {
                path: path.to_string(),
                body: other.to_string(),
            }),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.backend.as_str().trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use mockito::Matcher;
    use serde_json::json;

    fn client(backend: &str, token: Option<&str>) -> ApiClient {
        let state = AgentState {
            token: token.map(str::to_string),
            ..AgentState::default()
        };
        ApiClient::new(
            Url::parse(backend).unwrap(),
            RetryStrategy::new(RetryConfig {
                max_attempts: 2,
                backoff_base_ms: 1,
                backoff_max_ms: 2,
            }),
            Duration::from_secs(5),
            Arc::new(ArcSwap::from_pointee(state)),
        )
    }

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_request_adds_token_and_decodes_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v1/agent")
            .match_header("content-type", "application/json")
            .match_header("user-agent", "ServiceMonitorAgent/1.0")
            .match_body(Matcher::Json(json!({ "properties": {}, "token": "agent-key" })))
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let reply = client(&server.url(), Some("agent-key"))
            .request(Method::Put, "/api/v1/agent", object(json!({ "properties": {} })))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply.get("ok"), Some(&Value::Bool(true)));
    }

    #[tokio::test]
    async fn test_explicit_token_is_kept() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/agent")
            .match_body(Matcher::Json(json!({ "token": "project", "name": "host" })))
            .with_body(r#"{"apiKey": "k"}"#)
            .create_async()
            .await;

        client(&server.url(), Some("agent-key"))
            .request(
                Method::Post,
                "/api/v1/agent",
                object(json!({ "token": "project", "name": "host" })),
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_object_reply_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/metric")
            .with_body("[1, 2]")
            .create_async()
            .await;

        let result = client(&server.url(), None)
            .request(Method::Post, "/api/v1/metric", JsonObject::new())
            .await;

        assert!(matches!(result, Err(ApiError::NotAnObject { .. })));
    }

    #[tokio::test]
    async fn test_invalid_json_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/metric")
            .with_status(500)
            .with_body("<html>oops</html>")
            .expect(1)
            .create_async()
            .await;

        let result = client(&server.url(), None)
            .request(Method::Post, "/api/v1/metric", JsonObject::new())
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ApiError::Json(_))));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // nothing listens on port 9 on the loopback interface
        let result = client("http://127.0.0.1:9", None)
            .request(Method::Post, "/api/v1/metric", JsonObject::new())
            .await;

        assert!(matches!(
            result,
            Err(ApiError::Transport(TransportError::RequestFailed(_)))
        ));
    }

    #[test]
    fn test_url_keeps_backend_prefix() {
        let client = client("http://localhost:8080/monitor/", None);
        assert_eq!(
            client.url_for("/api/v1/metric"),
            "http://localhost:8080/monitor/api/v1/metric"
        );
    }
}
