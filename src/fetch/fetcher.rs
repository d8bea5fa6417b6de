// src/fetch/fetcher.rs
use super::buffer::ResponseBuffer;
use super::request::{PreparedRequest, RequestSpec};
use super::transport::{ReqwestTransport, Transport, TransportHandle};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to initialise transport: {0}")]
    InitFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

/// Perform one HTTP exchange with the production transport and return the
/// whole response body.
pub async fn fetch(spec: &RequestSpec) -> Result<ResponseBuffer, TransportError> {
    fetch_with(&ReqwestTransport, spec).await
}

/// Perform one HTTP exchange over `transport`.
///
/// A fresh handle is initialised for this call only and released before
/// returning on every path. HTTP status codes are not inspected.
pub async fn fetch_with<T: Transport>(
    transport: &T,
    spec: &RequestSpec,
) -> Result<ResponseBuffer, TransportError> {
    let request = PreparedRequest::from_spec(spec);

    let mut handle = transport.init().map_err(|reason| {
        warn!("Failed to init transport for {}: {}", request.url, reason);
        TransportError::InitFailed(reason)
    })?;

    debug!("{} {}", request.verb, request.url);

    let mut buffer = ResponseBuffer::new();
    let result = handle.perform(&request, &mut buffer).await;
    drop(handle);

    match result {
        Ok(()) => {
            debug!(
                "{} {} completed with {} bytes",
                request.verb,
                request.url,
                buffer.len()
            );
            Ok(buffer)
        }
        Err(reason) => {
            warn!("{} {} failed: {}", request.verb, request.url, reason);
            Err(TransportError::RequestFailed(reason))
        }
    }
}
