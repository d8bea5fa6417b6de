// src/fetch/transport.rs
use super::buffer::ResponseBuffer;
use super::request::{Method, PreparedRequest};
use async_trait::async_trait;
use reqwest::{header, redirect, Client};

/// One request/response exchange. The handle is released when dropped.
#[async_trait]
pub trait TransportHandle: Send {
    /// Send `request` and stream every received body chunk into `sink`.
    /// Errors carry the underlying library's description.
    async fn perform(
        &mut self,
        request: &PreparedRequest,
        sink: &mut ResponseBuffer,
    ) -> Result<(), String>;
}

/// Source of fresh transport handles, one per exchange.
pub trait Transport: Send + Sync {
    type Handle: TransportHandle;

    fn init(&self) -> Result<Self::Handle, String>;
}

/// Production transport on top of `reqwest`.
///
/// Every handle owns its own client with idle pooling disabled, so no
/// connection outlives the exchange it was opened for. Redirects are not
/// followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestTransport;

impl Transport for ReqwestTransport {
    type Handle = ReqwestHandle;

    fn init(&self) -> Result<Self::Handle, String> {
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| e.to_string())?;

        Ok(ReqwestHandle { client })
    }
}

pub struct ReqwestHandle {
    client: Client,
}

#[async_trait]
impl TransportHandle for ReqwestHandle {
    async fn perform(
        &mut self,
        request: &PreparedRequest,
        sink: &mut ResponseBuffer,
    ) -> Result<(), String> {
        let verb = match request.verb {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };

        let mut builder = self
            .client
            .request(verb, request.url.as_str())
            .header(header::USER_AGENT, request.user_agent);

        for (name, value) in &request.headers {
            builder = builder.header(*name, *value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let mut response = builder.send().await.map_err(|e| e.to_string())?;

        // status codes are not inspected, only transport failures count
        while let Some(chunk) = response.chunk().await.map_err(|e| e.to_string())? {
            sink.append(&chunk);
        }

        Ok(())
    }
}
