// src/core/normalizer/traceroute.rs

use super::{NOT_AVAILABLE, decode, first_answer, format_ms, settled_without_answer};
use crate::core::models::{
    Category, NormalizedData, RawCheckPayload, RouteSummary, RowStatus, TracerouteHop, TracerouteReport,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawTraceResult {
    #[serde(default, alias = "destination")]
    target: Option<String>,
    #[serde(default)]
    hops: Vec<RawHop>,
}

#[derive(Debug, Deserialize)]
struct RawHop {
    #[serde(default, alias = "hop")]
    ttl: u32,
    #[serde(default, alias = "address")]
    ip: Option<String>,
    #[serde(default, alias = "host")]
    hostname: Option<String>,
    /// Milliseconds; absent when the hop did not answer.
    #[serde(default, alias = "rtt")]
    time: Option<f64>,
    #[serde(default)]
    timeout: bool,
    #[serde(default, alias = "loss")]
    packet_loss: Option<f64>,
    #[serde(default)]
    asn: Option<Value>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    isp: Option<String>,
}

impl RawHop {
    fn into_hop(self) -> TracerouteHop {
        let ip = self.ip.filter(|ip| !ip.is_empty() && ip != "*");
        let time = match (self.timeout, self.time) {
            (true, _) => "timeout".to_string(),
            (false, Some(ms)) => format_ms(ms),
            (false, None) if ip.is_none() => "timeout".to_string(),
            (false, None) => NOT_AVAILABLE.to_string(),
        };
        TracerouteHop {
            ttl: self.ttl,
            ip: ip.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            hostname: self.hostname.filter(|h| !h.is_empty()),
            time,
            packet_loss: self.packet_loss.map(|loss| format!("{}%", loss.round())),
            asn: self.asn.and_then(|asn| match asn {
                Value::String(s) if !s.is_empty() => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            country: self.country.filter(|c| !c.is_empty()),
            isp: self.isp.filter(|i| !i.is_empty()),
        }
    }
}

fn summarize(hops: &[TracerouteHop]) -> RouteSummary {
    RouteSummary {
        total_hops: hops.len(),
        successful: hops.iter().filter(|hop| hop.is_answered()).count(),
        timeouts: hops.iter().filter(|hop| hop.is_timeout()).count(),
    }
}

fn empty_report(agent: String, status: RowStatus) -> TracerouteReport {
    TracerouteReport {
        agent,
        status,
        target: NOT_AVAILABLE.to_string(),
        hops: Vec::new(),
        summary: RouteSummary::default(),
    }
}

/// Aggregate route built from the first agent that answered.
///
/// A route with no hops yet is still in progress unless the check is complete.
pub fn normalize(payload: &RawCheckPayload) -> Option<NormalizedData> {
    let Some((index, task, value)) = first_answer(payload) else {
        let (agent, status) = settled_without_answer(payload)?;
        return Some(NormalizedData::Traceroute(empty_report(agent, status)));
    };

    let Some(raw) = decode::<RawTraceResult>(Category::Traceroute, value) else {
        return Some(NormalizedData::Traceroute(empty_report(task.label(index), RowStatus::Failed)));
    };
    if raw.hops.is_empty() && !payload.is_complete() {
        return None;
    }

    let hops: Vec<TracerouteHop> = raw.hops.into_iter().map(RawHop::into_hop).collect();
    Some(NormalizedData::Traceroute(TracerouteReport {
        agent: task.label(index),
        status: RowStatus::Success,
        target: raw.target.filter(|t| !t.is_empty()).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        summary: summarize(&hops),
        hops,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use serde_json::json;

    fn report(data: Option<NormalizedData>) -> TracerouteReport {
        match data {
            Some(NormalizedData::Traceroute(report)) => report,
            other => panic!("expected a traceroute report, got {other:?}"),
        }
    }

    #[test]
    fn hops_are_formatted_and_summarized() {
        let raw = payload(vec![task(
            "Frankfurt, DE",
            json!({
                "target": "example.com",
                "hops": [
                    {"ttl": 1, "ip": "192.168.1.1", "time": 1.234, "loss": 0.0},
                    {"ttl": 2, "ip": "*", "timeout": true},
                    {"ttl": 3, "ip": "203.0.113.9", "hostname": "edge.example.net", "asn": 15169, "loss": 33.3},
                    {"ttl": 4}
                ]
            }),
        )]);
        let report = report(normalize(&raw));
        assert_eq!(report.agent, "Frankfurt, DE");
        assert_eq!(report.target, "example.com");
        assert_eq!(report.hops[0].time, "1.23ms");
        assert_eq!(report.hops[0].packet_loss.as_deref(), Some("0%"));
        assert_eq!(report.hops[1].time, "timeout");
        assert_eq!(report.hops[1].ip, "N/A");
        assert_eq!(report.hops[2].time, "N/A");
        assert_eq!(report.hops[2].asn.as_deref(), Some("15169"));
        assert_eq!(report.hops[2].packet_loss.as_deref(), Some("33%"));
        assert_eq!(report.hops[3].time, "timeout");
        assert_eq!(report.summary, RouteSummary { total_hops: 4, successful: 1, timeouts: 2 });
    }

    #[test]
    fn route_without_hops_is_in_progress() {
        let raw = payload(vec![task("Frankfurt, DE", json!({"target": "example.com", "hops": []}))]);
        assert!(normalize(&raw).is_none());
    }

    #[test]
    fn complete_route_without_hops_is_final() {
        let mut raw = payload(vec![task("Frankfurt, DE", json!({"target": "example.com", "hops": []}))]);
        raw.complete = Some(true);
        let report = report(normalize(&raw));
        assert!(report.hops.is_empty());
        assert_eq!(report.summary.total_hops, 0);
    }

    #[test]
    fn failed_agents_produce_a_failed_report() {
        let raw = payload(vec![failed("Frankfurt, DE")]);
        assert_eq!(report(normalize(&raw)).status, RowStatus::Failed);
    }
}
