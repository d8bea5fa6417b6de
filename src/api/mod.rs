// src/api/mod.rs
mod client;

pub use client::{ApiClient, ApiError, JsonObject};
