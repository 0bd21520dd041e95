// src/core/normalizer/dns.rs

use super::{decode, first_answer, settled_without_answer};
use crate::core::models::{Category, DnsRecords, DnsReport, NormalizedData, RawCheckPayload, RowStatus};
use serde::Deserialize;
use tracing::debug;

/// Record lists as the agent reports them. Absent lists are empty.
#[derive(Debug, Default, Deserialize)]
struct RawDnsResult {
    #[serde(default, alias = "A")]
    a_records: Vec<String>,
    #[serde(default, alias = "AAAA")]
    aaaa_records: Vec<String>,
    #[serde(default, alias = "MX")]
    mx_records: Vec<String>,
    #[serde(default, alias = "NS")]
    ns_records: Vec<String>,
    #[serde(default, alias = "CNAME")]
    cname_records: Vec<String>,
    #[serde(default, alias = "TXT")]
    txt_records: Vec<String>,
}

/// Aggregate view: only the first task that answered is used.
pub fn normalize(payload: &RawCheckPayload) -> Option<NormalizedData> {
    let Some((index, task, value)) = first_answer(payload) else {
        let (agent, status) = settled_without_answer(payload)?;
        let report = DnsReport { agent, status, records: DnsRecords::default() };
        return Some(NormalizedData::Dns(report));
    };

    let agent = task.label(index);
    let report = match decode::<RawDnsResult>(Category::Dns, value) {
        Some(raw) => DnsReport {
            agent,
            status: RowStatus::Success,
            records: DnsRecords {
                a_records: raw.a_records,
                aaaa_records: raw.aaaa_records,
                mx_records: raw.mx_records,
                ns_records: raw.ns_records,
                cname_records: raw.cname_records,
                txt_records: raw.txt_records,
            },
        },
        None => DnsReport { agent, status: RowStatus::Failed, records: DnsRecords::default() },
    };
    debug!(agent = %report.agent, a = report.records.a_records.len(), "DNS result normalized.");
    Some(NormalizedData::Dns(report))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use serde_json::json;

    fn report(data: Option<NormalizedData>) -> DnsReport {
        match data {
            Some(NormalizedData::Dns(report)) => report,
            other => panic!("expected a DNS report, got {other:?}"),
        }
    }

    #[test]
    fn first_answer_is_used_and_missing_lists_default_to_empty() {
        let raw = payload(vec![
            placeholder("Toronto, CA"),
            task("New York, US", json!({"A": ["93.184.216.34"], "MX": ["10 mx.example.com"]})),
            task("London, UK", json!({"A": ["10.0.0.1"]})),
        ]);
        let report = report(normalize(&raw));
        assert_eq!(report.agent, "New York, US");
        assert_eq!(report.status, RowStatus::Success);
        assert_eq!(report.records.a_records, ["93.184.216.34"]);
        assert_eq!(report.records.mx_records, ["10 mx.example.com"]);
        assert!(report.records.aaaa_records.is_empty());
        assert!(report.records.cname_records.is_empty());
        assert!(report.records.txt_records.is_empty());
    }

    #[test]
    fn snake_case_fields_are_accepted() {
        let raw = payload(vec![task("Toronto, CA", json!({"ns_records": ["ns1.example.com"]}))]);
        assert_eq!(report(normalize(&raw)).records.ns_records, ["ns1.example.com"]);
    }

    #[test]
    fn failed_agents_settle_the_tab() {
        let raw = payload(vec![failed("Toronto, CA"), failed("London, UK")]);
        let report = report(normalize(&raw));
        assert_eq!(report.status, RowStatus::Failed);
        assert_eq!(report.agent, "Toronto, CA");
    }

    #[test]
    fn one_failure_with_others_pending_keeps_waiting() {
        let raw = payload(vec![failed("Toronto, CA"), placeholder("London, UK")]);
        assert!(normalize(&raw).is_none());
    }

    #[test]
    fn complete_payload_with_no_records_is_final() {
        let mut raw = payload(vec![placeholder("Toronto, CA")]);
        raw.complete = Some(true);
        let report = report(normalize(&raw));
        assert_eq!(report.status, RowStatus::Success);
        assert_eq!(report.records, DnsRecords::default());
    }
}
