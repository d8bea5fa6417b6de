// src/monitor/mysql.rs
use super::MonitorError;
use crate::api::JsonObject;
use crate::config::MysqlTarget;
use crate::probe::{query_questions_counter_with, DatabaseCredentials, StatusDriver};
use serde_json::Value;

/// Report the server's running `Questions` counter.
pub async fn collect_mysql_with<D: StatusDriver>(
    driver: &D,
    target: &MysqlTarget,
) -> Result<JsonObject, MonitorError> {
    let creds = DatabaseCredentials::from(target);
    let counter = query_questions_counter_with(driver, &creds).await?;

    let mut result = JsonObject::new();
    result.insert("questions".to_string(), Value::from(counter.value()));
    Ok(result)
}
