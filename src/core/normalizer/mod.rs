// src/core/normalizer/mod.rs

//! Pure transforms from a raw check payload to the view model of one category.
//!
//! Every transform returns `None` while the backend has not produced usable
//! data yet, which is what drives the orchestrator's retry loop. A task whose
//! `failed` flag is set is a finished row, never "not ready". A payload with
//! `complete: true` is always final.

pub mod dns;
pub mod geoip;
pub mod http;
pub mod ping;
pub mod ports;
pub mod portscan;
pub mod traceroute;

use crate::core::models::{Category, NormalizedData, RawCheckPayload, RawTask, RowStatus};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

pub type NormalizeFn = fn(&RawCheckPayload) -> Option<NormalizedData>;

/// The dispatch table. Adding a category without a transform does not compile.
pub fn normalizer_for(category: Category) -> NormalizeFn {
    match category {
        Category::Dns => dns::normalize,
        Category::Http => http::normalize,
        Category::Ping => ping::normalize,
        Category::Traceroute => traceroute::normalize,
        Category::Tcp => ports::normalize_tcp,
        Category::Udp => ports::normalize_udp,
        Category::GeoIp => geoip::normalize,
        Category::PortScan => portscan::normalize,
    }
}

pub fn normalize(category: Category, payload: &RawCheckPayload) -> Option<NormalizedData> {
    normalizer_for(category)(payload)
}

// --- Shared helpers ---

/// Formats a duration given in milliseconds, e.g. `12.35ms`.
pub fn format_ms(value: f64) -> String {
    format!("{:.2}ms", value)
}

/// Optional latency, rendered as `N/A` when absent.
pub fn format_ms_or_na(value: Option<f64>) -> String {
    value.map(format_ms).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `round((sent - received) / sent * 100)%`, or `0%` when nothing was sent.
pub fn packet_loss(sent: u32, received: u32) -> String {
    if sent == 0 {
        return "0%".to_string();
    }
    let lost = sent.saturating_sub(received) as f64;
    format!("{}%", (lost / sent as f64 * 100.0).round() as u32)
}

pub const NOT_AVAILABLE: &str = "N/A";

pub(crate) fn or_na(value: Option<String>) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Decodes a task's result into the category's raw shape.
/// A result that does not fit is logged and treated as a failed row.
pub(crate) fn decode<T: DeserializeOwned>(category: Category, value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(%category, error = %e, "Discarding malformed task result.");
            None
        }
    }
}

/// The first task that carries a result, with its position.
pub(crate) fn first_answer(payload: &RawCheckPayload) -> Option<(usize, &RawTask, &Value)> {
    payload
        .task_results
        .iter()
        .enumerate()
        .find_map(|(index, task)| match task.result_value() {
            Some(value) if !task.failed => Some((index, task, value)),
            _ => None,
        })
}

/// Aggregate categories with no answering agent: the label of the first agent
/// and the report status, or `None` while the check is still running.
pub(crate) fn settled_without_answer(payload: &RawCheckPayload) -> Option<(String, RowStatus)> {
    let tasks = &payload.task_results;
    let all_failed = !tasks.is_empty() && tasks.iter().all(|task| task.failed);
    if !(payload.is_complete() || all_failed) {
        return None;
    }
    let agent = tasks
        .first()
        .map(|task| task.label(0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let status = if all_failed { RowStatus::Failed } else { RowStatus::Success };
    Some((agent, status))
}

/// Builds one row per agent and decides readiness for per-agent categories.
///
/// `build` turns a task's result into a row and may itself mark the row
/// `Pending` when the result is still a placeholder in disguise (a geoip
/// answer without an IP, a ping without a reply). It returns `None` for a
/// result it cannot read, which becomes a failed row. `placeholder` builds
/// the rows of failed tasks and of tasks without a result.
///
/// The payload is ready once any row has settled, or when it is complete.
pub(crate) fn per_agent_rows<T>(
    payload: &RawCheckPayload,
    mut build: impl FnMut(usize, &RawTask, &Value) -> Option<T>,
    mut placeholder: impl FnMut(usize, &RawTask, RowStatus) -> T,
    status_of: impl Fn(&T) -> RowStatus,
) -> Option<Vec<T>> {
    let mut rows = Vec::with_capacity(payload.task_results.len());
    for (index, task) in payload.task_results.iter().enumerate() {
        let row = if task.failed {
            placeholder(index, task, RowStatus::Failed)
        } else {
            match task.result_value() {
                Some(value) => match build(index, task, value) {
                    Some(row) => row,
                    None => placeholder(index, task, RowStatus::Failed),
                },
                None => placeholder(index, task, RowStatus::Pending),
            }
        };
        rows.push(row);
    }

    let any_settled = rows.iter().any(|row| status_of(row) != RowStatus::Pending);
    if payload.is_complete() || any_settled {
        Some(rows)
    } else {
        None
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn packet_loss_rounds_and_guards_zero() {
        assert_eq!(packet_loss(4, 4), "0%");
        assert_eq!(packet_loss(4, 0), "100%");
        assert_eq!(packet_loss(0, 0), "0%");
        assert_eq!(packet_loss(3, 2), "33%");
        assert_eq!(packet_loss(3, 1), "67%");
        assert_eq!(packet_loss(2, 5), "0%");
    }

    #[test]
    fn milliseconds_have_two_decimals() {
        assert_eq!(format_ms(12.345_6), "12.35ms");
        assert_eq!(format_ms(3.0), "3.00ms");
        assert_eq!(format_ms_or_na(None), "N/A");
    }

    #[test]
    fn all_placeholder_payloads_are_not_ready_for_every_category() {
        let raw = payload(vec![placeholder("Toronto, CA"), placeholder("Frankfurt, DE")]);
        for category in Category::iter() {
            assert!(normalize(category, &raw).is_none(), "{category} should not be ready");
        }
    }

    #[test]
    fn empty_task_list_is_not_ready_unless_complete() {
        let mut raw = payload(vec![]);
        assert!(normalize(Category::Http, &raw).is_none());
        raw.complete = Some(true);
        assert!(normalize(Category::Http, &raw).is_some());
        assert!(normalize(Category::Dns, &raw).is_some());
    }
}
