// src/core/models.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

// --- Categories ---

/// One diagnostic dimension, shown as one tab.
///
/// The declaration order is the tab order of the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    Display, EnumIter, EnumString, EnumCount,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    #[strum(to_string = "geoip", serialize = "info")]
    GeoIp,
    Http,
    Ping,
    Tcp,
    Udp,
    Dns,
    Traceroute,
    PortScan,
}

/// Transport protocol parameter of the shared `port` remote check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

/// How the target is handed to the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    Url,
    Domain,
}

impl Category {
    /// All categories in tab order.
    pub fn all() -> impl Iterator<Item = Category> {
        Category::iter()
    }

    /// Position of the category in tab order; used as a dense index.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Category> {
        Category::iter().nth(index)
    }

    /// Human-readable tab title.
    pub fn label(self) -> &'static str {
        match self {
            Category::GeoIp => "Basic Info",
            Category::Http => "HTTP(S)",
            Category::Ping => "Ping",
            Category::Tcp => "TCP",
            Category::Udp => "UDP",
            Category::Dns => "DNS",
            Category::Traceroute => "Traceroute",
            Category::PortScan => "Port Scan",
        }
    }

    /// The check type understood by the remote service.
    /// `tcp` and `udp` share one remote type and differ by [`Category::protocol`].
    pub fn remote_type(self) -> &'static str {
        match self {
            Category::GeoIp => "info",
            Category::Http => "http",
            Category::Ping => "ping",
            Category::Tcp | Category::Udp => "port",
            Category::Dns => "dns",
            Category::Traceroute => "traceroute",
            Category::PortScan => "nmap",
        }
    }

    pub fn protocol(self) -> Option<Protocol> {
        match self {
            Category::Tcp => Some(Protocol::Tcp),
            Category::Udp => Some(Protocol::Udp),
            _ => None,
        }
    }

    pub fn requires_port(self) -> bool {
        self.protocol().is_some()
    }

    pub fn target_field(self) -> TargetField {
        match self {
            Category::Dns => TargetField::Domain,
            _ => TargetField::Url,
        }
    }
}

// --- Remote check identity and payloads ---

/// Opaque identifier of one remote check job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(pub String);

impl CheckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw response of `GET /checks/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCheckPayload {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default, rename = "type")]
    pub check_type: Option<String>,
    /// Authoritative completion flag. When `Some(true)` the result is final even if empty.
    #[serde(default)]
    pub complete: Option<bool>,
    #[serde(default, alias = "tasks")]
    pub task_results: Vec<RawTask>,
}

impl RawCheckPayload {
    pub fn is_complete(&self) -> bool {
        self.complete == Some(true)
    }
}

/// One agent's contribution to a check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    #[serde(default, alias = "agent_name")]
    pub agent: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "is_failed")]
    pub failed: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl RawTask {
    /// The result object, or `None` when the backend has only left a placeholder.
    pub fn result_value(&self) -> Option<&serde_json::Value> {
        match &self.result {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Object(map)) if map.is_empty() => None,
            Some(value) => Some(value),
        }
    }

    /// Display name of the agent that ran this task.
    pub fn label(&self, index: usize) -> String {
        self.location
            .clone()
            .or_else(|| self.agent.clone())
            .unwrap_or_else(|| format!("Agent {}", index + 1))
    }
}

/// Per-category parameters sent along with a check submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    pub ping_count: u32,
    pub traceroute_max_hops: u32,
    pub http_timeout_secs: u32,
    pub portscan_ports: Option<String>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            ping_count: 4,
            traceroute_max_hops: 30,
            http_timeout_secs: 10,
            portscan_ports: None,
        }
    }
}

// --- Normalized view models ---

/// Outcome of one agent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum RowStatus {
    Success,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsRecords {
    pub a_records: Vec<String>,
    pub aaaa_records: Vec<String>,
    pub mx_records: Vec<String>,
    pub ns_records: Vec<String>,
    pub cname_records: Vec<String>,
    pub txt_records: Vec<String>,
}

/// Aggregate DNS view built from the first answering agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsReport {
    pub agent: String,
    pub status: RowStatus,
    pub records: DnsRecords,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRow {
    pub agent: String,
    pub status: RowStatus,
    pub code: Option<u16>,
    pub response_time: String,
    pub ip: String,
    pub ssl: bool,
    pub server: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingRow {
    pub agent: String,
    pub status: RowStatus,
    pub packets_sent: u32,
    pub packets_received: u32,
    pub packet_loss: String,
    pub min_time: String,
    pub avg_time: String,
    pub max_time: String,
    pub ip: String,
}

/// TCP or UDP reachability of the session port from one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRow {
    pub agent: String,
    pub status: RowStatus,
    pub port: Option<u16>,
    pub reachable: bool,
    pub latency: String,
    pub protocol: Protocol,
    pub ip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRow {
    pub agent: String,
    pub status: RowStatus,
    pub ip: String,
    pub isp: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub postal_code: String,
    pub timezone: String,
    pub coordinates: Option<Coordinates>,
    pub coordinates_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerouteHop {
    pub ttl: u32,
    pub ip: String,
    pub hostname: Option<String>,
    pub time: String,
    pub packet_loss: Option<String>,
    pub asn: Option<String>,
    pub country: Option<String>,
    pub isp: Option<String>,
}

impl TracerouteHop {
    pub fn is_timeout(&self) -> bool {
        self.time == "timeout"
    }

    pub fn is_answered(&self) -> bool {
        self.time != "timeout" && self.time != "N/A"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub total_hops: usize,
    pub successful: usize,
    pub timeouts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerouteReport {
    pub agent: String,
    pub status: RowStatus,
    pub target: String,
    pub hops: Vec<TracerouteHop>,
    pub summary: RouteSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRuntime {
    pub time: String,
    pub elapsed: String,
    pub exit: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedPort {
    pub port: u16,
    pub protocol: String,
    pub state: String,
    pub reason: String,
    pub service: String,
    pub confidence: String,
    pub cpe: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsMatch {
    pub name: String,
    pub accuracy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedHost {
    pub ip: String,
    pub hostname: String,
    pub ports: Vec<ScannedPort>,
    pub os_matches: Vec<OsMatch>,
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortScanRow {
    pub agent: String,
    pub status: RowStatus,
    pub runtime: Option<ScanRuntime>,
    pub hosts: Vec<ScannedHost>,
}

/// Category-specific view model produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NormalizedData {
    Dns(DnsReport),
    Traceroute(TracerouteReport),
    Http(Vec<HttpRow>),
    Ping(Vec<PingRow>),
    Ports(Vec<PortRow>),
    GeoIp(Vec<GeoRow>),
    PortScan(Vec<PortScanRow>),
}

impl NormalizedData {
    /// Number of view records (agents for per-agent categories, 1 for aggregates).
    pub fn record_count(&self) -> usize {
        match self {
            NormalizedData::Dns(_) | NormalizedData::Traceroute(_) => 1,
            NormalizedData::Http(rows) => rows.len(),
            NormalizedData::Ping(rows) => rows.len(),
            NormalizedData::Ports(rows) => rows.len(),
            NormalizedData::GeoIp(rows) => rows.len(),
            NormalizedData::PortScan(rows) => rows.len(),
        }
    }
}
