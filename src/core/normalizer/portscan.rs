// src/core/normalizer/portscan.rs

//! Port scan results in nmap's JSON layout.
//!
//! The scan is keyed by host address, next to the `runtime` and `stats`
//! sections. Some agents nest the whole scan under `os_detection`.

use super::{NOT_AVAILABLE, per_agent_rows};
use crate::core::models::{
    NormalizedData, OsMatch, PortScanRow, RawCheckPayload, RowStatus, ScanRuntime, ScannedHost, ScannedPort,
};
use serde_json::{Map, Value};
use tracing::warn;

const RESERVED_KEYS: [&str; 3] = ["runtime", "stats", "task_results"];

pub fn normalize(payload: &RawCheckPayload) -> Option<NormalizedData> {
    per_agent_rows(
        payload,
        |index, task, value| {
            let Some(scan) = scan_section(value) else {
                warn!(agent = %task.label(index), "Port scan result is not an object.");
                return None;
            };
            let runtime = scan.get("runtime").map(|runtime| parse_runtime(runtime, scan.get("stats")));
            let hosts: Vec<ScannedHost> = scan
                .iter()
                .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
                .map(|(ip, host)| parse_host(ip, host))
                .collect();
            // Nothing scanned and no runtime section: the scan has not run yet.
            let status = if hosts.is_empty() && runtime.is_none() {
                RowStatus::Pending
            } else {
                RowStatus::Success
            };
            Some(PortScanRow { agent: task.label(index), status, runtime, hosts })
        },
        |index, task, status| PortScanRow { agent: task.label(index), status, runtime: None, hosts: Vec::new() },
        |row| row.status,
    )
    .map(NormalizedData::PortScan)
}

fn scan_section(value: &Value) -> Option<&Map<String, Value>> {
    match value.get("os_detection") {
        Some(nested) => nested.as_object(),
        None => value.as_object(),
    }
}

/// Strings and numbers both show up for the same nmap fields.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn parse_runtime(runtime: &Value, stats: Option<&Value>) -> ScanRuntime {
    ScanRuntime {
        time: text(runtime.get("timestr").or_else(|| runtime.get("time"))),
        elapsed: text(runtime.get("elapsed")),
        exit: text(runtime.get("exit")),
        version: text(stats.and_then(|stats| stats.get("version"))),
    }
}

fn parse_host(ip: &str, host: &Value) -> ScannedHost {
    let hostname = host
        .get("hostname")
        .and_then(Value::as_array)
        .and_then(|names| names.first())
        .and_then(|first| first.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    let ports: Vec<ScannedPort> = host
        .get("ports")
        .and_then(Value::as_array)
        .map(|ports| ports.iter().filter_map(parse_port).collect())
        .unwrap_or_default();

    let os_matches = host
        .get("osmatch")
        .and_then(Value::as_array)
        .map(|matches| {
            matches
                .iter()
                .map(|m| OsMatch { name: text(m.get("name")), accuracy: text(m.get("accuracy")) })
                .collect()
        })
        .unwrap_or_default();

    let count = |state: &str| ports.iter().filter(|port| port.state == state).count();
    ScannedHost {
        ip: ip.to_string(),
        hostname,
        open: count("open"),
        closed: count("closed"),
        filtered: count("filtered"),
        ports,
        os_matches,
    }
}

fn parse_port(port: &Value) -> Option<ScannedPort> {
    let number = match port.get("portid").or_else(|| port.get("port"))? {
        Value::String(s) => s.parse::<u16>().ok()?,
        Value::Number(n) => u16::try_from(n.as_u64()?).ok()?,
        _ => return None,
    };
    let service = port.get("service");
    let cpe = port
        .get("cpe")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(s) => Some(s.clone()),
                    other => other.get("cpe").and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(ScannedPort {
        port: number,
        protocol: text(port.get("protocol")),
        state: text(port.get("state")),
        reason: text(port.get("reason")),
        service: service
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        confidence: text(service.and_then(|s| s.get("conf"))),
        cpe,
    })
}
