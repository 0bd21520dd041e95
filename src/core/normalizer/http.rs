// src/core/normalizer/http.rs

use super::{NOT_AVAILABLE, decode, format_ms_or_na, or_na, per_agent_rows};
use crate::core::models::{Category, HttpRow, NormalizedData, RawCheckPayload, RowStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawHttpResult {
    #[serde(default, alias = "status_code")]
    code: Option<u16>,
    /// Milliseconds.
    #[serde(default, alias = "time", alias = "latency")]
    response_time: Option<f64>,
    #[serde(default, alias = "ip_address")]
    ip: Option<String>,
    #[serde(default, alias = "is_ssl", alias = "https")]
    ssl: bool,
    #[serde(default)]
    server: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub fn normalize(payload: &RawCheckPayload) -> Option<NormalizedData> {
    per_agent_rows(
        payload,
        |index, task, value| {
            let raw: RawHttpResult = decode(Category::Http, value)?;
            // An agent that reports an error, or answers without a status code, did not reach the target.
            let status = match (&raw.error, raw.code) {
                (None, Some(_)) => RowStatus::Success,
                _ => RowStatus::Failed,
            };
            Some(HttpRow {
                agent: task.label(index),
                status,
                code: raw.code,
                response_time: format_ms_or_na(raw.response_time),
                ip: or_na(raw.ip),
                ssl: raw.ssl,
                server: or_na(raw.server),
            })
        },
        |index, task, status| HttpRow {
            agent: task.label(index),
            status,
            code: None,
            response_time: NOT_AVAILABLE.to_string(),
            ip: NOT_AVAILABLE.to_string(),
            ssl: false,
            server: NOT_AVAILABLE.to_string(),
        },
        |row| row.status,
    )
    .map(NormalizedData::Http)
}
