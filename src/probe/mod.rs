// src/probe/mod.rs
mod driver;
mod status;

pub use driver::{MySqlDriver, MySqlStatusConnection, StatusConnection, StatusDriver, StatusRow};
pub use status::{
    query_questions_counter, query_questions_counter_with, DatabaseCredentials, ProbeError,
    StatusCounter, QUESTIONS_QUERY,
};
