// src/monitor/memory.rs
// https://www.kernel.org/doc/Documentation/filesystems/proc.txt
use super::{read_proc, MonitorError};
use crate::api::JsonObject;
use serde_json::Value;

const MEMINFO: &str = "/proc/meminfo";

pub async fn collect_memory() -> Result<JsonObject, MonitorError> {
    parse_meminfo(&read_proc(MEMINFO).await?)
}

/// Pick the tracked fields out of `/proc/meminfo`. Amounts stay in kB.
pub fn parse_meminfo(contents: &str) -> Result<JsonObject, MonitorError> {
    let mut result = JsonObject::new();

    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        let key = match fields.next().and_then(report_key) {
            Some(key) => key,
            None => continue,
        };

        let amount = fields
            .next()
            .and_then(|amount| amount.parse::<u64>().ok())
            .ok_or_else(|| MonitorError::Parse {
                path: MEMINFO,
                line: line.to_string(),
            })?;

        result.insert(key.to_string(), Value::from(amount));
    }

    Ok(result)
}

fn report_key(field: &str) -> Option<&'static str> {
    match field {
        "MemTotal:" => Some("total"),
        "MemFree:" => Some("free"),
        "MemAvailable:" => Some("available"),
        "Buffers:" => Some("buffers"),
        "Cached:" => Some("cached"),
        "SwapTotal:" => Some("swapTotal"),
        "SwapFree:" => Some("swapFree"),
        _ => None,
    }
}
