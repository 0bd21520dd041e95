// src/core/session.rs

use crate::core::error::{CheckError, FieldError};
use crate::core::models::{Category, CheckOptions, Protocol, TargetField};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Host names, IPv4 and bracket-less IPv6 literals.
static RE_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9\-._:]*[A-Za-z0-9])?$").unwrap());

/// Identity of one diagnostic run. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One submitted target+port. Target and port are immutable for the
/// lifetime of the session; the remote check ids created for it are
/// tracked by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    target: String,
    port: Option<u16>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Validates the raw form input and builds a session.
    ///
    /// Every field error is collected so the caller can display them together.
    pub fn new(id: SessionId, target: &str, port: Option<&str>) -> Result<Self, CheckError> {
        let mut errors = Vec::new();
        let target = normalize_target(target).map_err(|e| errors.push(e)).ok();
        let port = parse_port(port).map_err(|e| errors.push(e)).ok().flatten();

        match target {
            Some(target) if errors.is_empty() => Ok(Self { id, target, port, created_at: Utc::now() }),
            _ => Err(CheckError::Validation(errors)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// `tcp`/`udp` cannot run without a port; that is fixed for the whole session.
    pub fn is_available(&self, category: Category) -> bool {
        !category.requires_port() || self.port.is_some()
    }

    /// Builds the remote submission for `category`, or `None` if the
    /// category is unavailable for this session.
    pub fn check_request(&self, category: Category, options: &CheckOptions) -> Option<CheckRequest> {
        if !self.is_available(category) {
            return None;
        }
        let (url, domain) = match category.target_field() {
            TargetField::Url => (Some(self.target.clone()), None),
            TargetField::Domain => (None, Some(self.target.clone())),
        };

        let mut request = CheckRequest {
            check_type: category.remote_type(),
            url,
            domain,
            port: if category.requires_port() { self.port } else { None },
            protocol: category.protocol(),
            count: None,
            max_hops: None,
            timeout: None,
            ports: None,
        };
        match category {
            Category::Ping => request.count = Some(options.ping_count),
            Category::Traceroute => request.max_hops = Some(options.traceroute_max_hops),
            Category::Http => request.timeout = Some(options.http_timeout_secs),
            Category::PortScan => request.ports = options.portscan_ports.clone(),
            Category::GeoIp | Category::Tcp | Category::Udp | Category::Dns => {}
        }
        Some(request)
    }
}

/// The `payload` object of `POST /checks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRequest {
    #[serde(rename = "type")]
    pub check_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hops: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}

/// Reduces user input to a bare host: the scheme, path and port of a URL are dropped.
pub fn normalize_target(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("target", "This field is required"));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let host = Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_matches(['[', ']']).to_string()))
        .unwrap_or_else(|| trimmed.to_string());

    if RE_TARGET.is_match(&host) {
        Ok(host)
    } else {
        Err(FieldError::new("target", "Must be a valid hostname or IP address"))
    }
}

/// Empty input means "no port". Anything else must be a decimal in 1..=65535.
pub fn parse_port(raw: Option<&str>) -> Result<Option<u16>, FieldError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u16>() {
        Ok(port) if port > 0 && raw.chars().all(|c| c.is_ascii_digit()) => Ok(Some(port)),
        _ => Err(FieldError::new("port", "Must be a valid integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(target: &str, port: Option<&str>) -> Session {
        Session::new(SessionId(1), target, port).unwrap()
    }

    #[test]
    fn target_is_reduced_to_its_host() {
        assert_eq!(normalize_target("https://Example.com/path?q=1").unwrap(), "example.com");
        assert_eq!(normalize_target("  8.8.8.8 ").unwrap(), "8.8.8.8");
        assert_eq!(normalize_target("example.com:8443").unwrap(), "example.com");
    }

    #[test]
    fn empty_and_garbage_targets_are_rejected() {
        assert_eq!(normalize_target("   ").unwrap_err().message, "This field is required");
        assert_eq!(normalize_target("exa mple!").unwrap_err().field, "target");
    }

    #[test]
    fn port_parsing() {
        assert_eq!(parse_port(None).unwrap(), None);
        assert_eq!(parse_port(Some("")).unwrap(), None);
        assert_eq!(parse_port(Some("443")).unwrap(), Some(443));
        assert!(parse_port(Some("0")).is_err());
        assert!(parse_port(Some("70000")).is_err());
        assert!(parse_port(Some("+80")).is_err());
    }

    #[test]
    fn invalid_input_reports_every_field() {
        let err = Session::new(SessionId(1), "", Some("abc")).unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, ["target", "port"]);
    }

    #[test]
    fn port_categories_unavailable_without_port() {
        let s = session("example.com", None);
        assert!(!s.is_available(Category::Tcp));
        assert!(!s.is_available(Category::Udp));
        assert!(s.is_available(Category::Dns));
        assert!(s.check_request(Category::Tcp, &CheckOptions::default()).is_none());
    }

    #[test]
    fn udp_request_carries_port_and_protocol() {
        let s = session("example.com", Some("53"));
        let request = s.check_request(Category::Udp, &CheckOptions::default()).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "port", "url": "example.com", "port": 53, "protocol": "udp"})
        );
    }

    #[test]
    fn dns_request_sends_domain_and_ping_sends_count() {
        let s = session("example.com", Some("443"));
        let dns = s.check_request(Category::Dns, &CheckOptions::default()).unwrap();
        assert_eq!(dns.domain.as_deref(), Some("example.com"));
        assert!(dns.url.is_none());
        assert!(dns.port.is_none());

        let ping = s.check_request(Category::Ping, &CheckOptions::default()).unwrap();
        assert_eq!(ping.count, Some(4));
    }
}
