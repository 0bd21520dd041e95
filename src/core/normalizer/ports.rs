// src/core/normalizer/ports.rs

//! TCP and UDP reachability share one row shape.

use super::{NOT_AVAILABLE, decode, format_ms_or_na, or_na, per_agent_rows};
use crate::core::models::{Category, NormalizedData, PortRow, Protocol, RawCheckPayload, RowStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawPortResult {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default, alias = "open", alias = "is_open")]
    reachable: bool,
    #[serde(default, alias = "time", alias = "response_time")]
    latency: Option<f64>,
    #[serde(default, alias = "ip_address")]
    ip: Option<String>,
}

pub fn normalize_tcp(payload: &RawCheckPayload) -> Option<NormalizedData> {
    normalize(payload, Protocol::Tcp)
}

pub fn normalize_udp(payload: &RawCheckPayload) -> Option<NormalizedData> {
    normalize(payload, Protocol::Udp)
}

fn normalize(payload: &RawCheckPayload, protocol: Protocol) -> Option<NormalizedData> {
    let category = match protocol {
        Protocol::Tcp => Category::Tcp,
        Protocol::Udp => Category::Udp,
    };
    per_agent_rows(
        payload,
        |index, task, value| {
            let raw: RawPortResult = decode(category, value)?;
            Some(PortRow {
                agent: task.label(index),
                status: RowStatus::Success,
                port: raw.port,
                reachable: raw.reachable,
                latency: format_ms_or_na(raw.latency),
                protocol,
                ip: or_na(raw.ip),
            })
        },
        |index, task, status| PortRow {
            agent: task.label(index),
            status,
            port: None,
            reachable: false,
            latency: NOT_AVAILABLE.to_string(),
            protocol,
            ip: NOT_AVAILABLE.to_string(),
        },
        |row| row.status,
    )
    .map(NormalizedData::Ports)
}
