// src/lib.rs
pub mod agent;
pub mod api;
pub mod clock;
pub mod config;
pub mod fetch;
pub mod monitor;
pub mod probe;
pub mod retry;
