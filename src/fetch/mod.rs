// src/fetch/mod.rs
mod buffer;
mod fetcher;
mod request;
mod transport;

pub use buffer::ResponseBuffer;
pub use fetcher::{fetch, fetch_with, TransportError};
pub use request::{Method, PreparedRequest, RequestSpec, JSON_CONTENT_TYPE, USER_AGENT};
pub use transport::{ReqwestHandle, ReqwestTransport, Transport, TransportHandle};
