// src/fetch/buffer.rs
use std::borrow::Cow;

/// Response body accumulated chunk by chunk while an exchange is in flight.
///
/// The buffer is owned by whoever receives it from [`fetch`](super::fetch);
/// nothing else keeps a reference to it once the exchange is over.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResponseBuffer {
    bytes: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one received chunk after everything received so far.
    /// Returns the number of bytes taken, which is always the whole chunk.
    pub fn append(&mut self, chunk: &[u8]) -> usize {
        self.bytes.extend_from_slice(chunk);
        chunk.len()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Body as text. Invalid UTF-8 is replaced rather than rejected, so an
    /// empty or binary body is still readable.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn into_string(self) -> String {
        match String::from_utf8(self.bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

impl From<Vec<u8>> for ResponseBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}
