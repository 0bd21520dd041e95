// src/core/normalizer/ping.rs

use super::{NOT_AVAILABLE, decode, format_ms_or_na, packet_loss, per_agent_rows};
use crate::core::models::{Category, NormalizedData, PingRow, RawCheckPayload, RowStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawPingResult {
    #[serde(default, alias = "sent", alias = "transmitted")]
    packets_sent: u32,
    #[serde(default, alias = "received")]
    packets_received: u32,
    #[serde(default, alias = "min", alias = "rtt_min")]
    min_time: Option<f64>,
    #[serde(default, alias = "avg", alias = "rtt_avg")]
    avg_time: Option<f64>,
    #[serde(default, alias = "max", alias = "rtt_max")]
    max_time: Option<f64>,
    #[serde(default, alias = "ip_address")]
    ip: Option<String>,
}

pub fn normalize(payload: &RawCheckPayload) -> Option<NormalizedData> {
    per_agent_rows(
        payload,
        |index, task, value| {
            let raw: RawPingResult = decode(Category::Ping, value)?;
            let ip = raw.ip.filter(|ip| !ip.is_empty());
            // No resolved address and nothing sent yet: the agent has not started.
            let status = if ip.is_none() && raw.packets_sent == 0 {
                RowStatus::Pending
            } else {
                RowStatus::Success
            };
            Some(PingRow {
                agent: task.label(index),
                status,
                packets_sent: raw.packets_sent,
                packets_received: raw.packets_received,
                packet_loss: packet_loss(raw.packets_sent, raw.packets_received),
                min_time: format_ms_or_na(raw.min_time),
                avg_time: format_ms_or_na(raw.avg_time),
                max_time: format_ms_or_na(raw.max_time),
                ip: ip.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            })
        },
        |index, task, status| PingRow {
            agent: task.label(index),
            status,
            packets_sent: 0,
            packets_received: 0,
            packet_loss: packet_loss(0, 0),
            min_time: NOT_AVAILABLE.to_string(),
            avg_time: NOT_AVAILABLE.to_string(),
            max_time: NOT_AVAILABLE.to_string(),
            ip: NOT_AVAILABLE.to_string(),
        },
        |row| row.status,
    )
    .map(NormalizedData::Ping)
}
