// src/core/normalizer/geoip.rs

use super::{NOT_AVAILABLE, decode, or_na, per_agent_rows};
use crate::core::models::{Category, Coordinates, GeoRow, NormalizedData, RawCheckPayload, RowStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawGeoResult {
    #[serde(default, alias = "query", alias = "ip_address")]
    ip: Option<String>,
    #[serde(default, alias = "org")]
    isp: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default, alias = "regionName", alias = "region_name")]
    region: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, alias = "zip", alias = "postal")]
    postal_code: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "lon", alias = "longitude")]
    lng: Option<f64>,
}

/// Geolocation rows. An answer without an IP has not been resolved yet.
pub fn normalize(payload: &RawCheckPayload) -> Option<NormalizedData> {
    per_agent_rows(
        payload,
        |index, task, value| {
            let raw: RawGeoResult = decode(Category::GeoIp, value)?;
            let Some(ip) = raw.ip.filter(|ip| !ip.is_empty()) else {
                return Some(placeholder_row(task.label(index), RowStatus::Pending));
            };
            let coordinates = match (raw.lat, raw.lng) {
                (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
                _ => None,
            };
            Some(GeoRow {
                agent: task.label(index),
                status: RowStatus::Success,
                ip,
                isp: or_na(raw.isp),
                country: or_na(raw.country),
                region: or_na(raw.region),
                city: or_na(raw.city),
                postal_code: or_na(raw.postal_code),
                timezone: or_na(raw.timezone),
                coordinates_label: coordinates_label(coordinates),
                coordinates,
            })
        },
        |index, task, status| placeholder_row(task.label(index), status),
        |row| row.status,
    )
    .map(NormalizedData::GeoIp)
}

fn placeholder_row(agent: String, status: RowStatus) -> GeoRow {
    GeoRow {
        agent,
        status,
        ip: NOT_AVAILABLE.to_string(),
        isp: NOT_AVAILABLE.to_string(),
        country: NOT_AVAILABLE.to_string(),
        region: NOT_AVAILABLE.to_string(),
        city: NOT_AVAILABLE.to_string(),
        postal_code: NOT_AVAILABLE.to_string(),
        timezone: NOT_AVAILABLE.to_string(),
        coordinates: None,
        coordinates_label: NOT_AVAILABLE.to_string(),
    }
}

fn coordinates_label(coordinates: Option<Coordinates>) -> String {
    match coordinates {
        Some(Coordinates { lat, lng }) => format!("{:.4}, {:.4}", lat, lng),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use serde_json::json;

    fn rows(data: Option<NormalizedData>) -> Vec<GeoRow> {
        match data {
            Some(NormalizedData::GeoIp(rows)) => rows,
            other => panic!("expected geoip rows, got {other:?}"),
        }
    }

    #[test]
    fn resolved_answer_fills_the_row() {
        let raw = payload(vec![task(
            "Toronto, CA",
            json!({
                "query": "8.8.8.8", "isp": "Google LLC", "country": "United States",
                "regionName": "California", "city": "Mountain View", "zip": "94043",
                "timezone": "America/Los_Angeles", "lat": 37.386_07, "lon": -122.083_81
            }),
        )]);
        let row = &rows(normalize(&raw))[0];
        assert_eq!(row.status, RowStatus::Success);
        assert_eq!(row.ip, "8.8.8.8");
        assert_eq!(row.region, "California");
        assert_eq!(row.postal_code, "94043");
        assert_eq!(row.coordinates_label, "37.3861, -122.0838");
    }

    #[test]
    fn answer_without_ip_keeps_polling() {
        let raw = payload(vec![
            task("Toronto, CA", json!({"country": "Canada"})),
            placeholder("London, UK"),
        ]);
        assert!(normalize(&raw).is_none());
    }

    #[test]
    fn unresolved_rows_show_na_once_another_agent_settles() {
        let raw = payload(vec![
            task("Toronto, CA", json!({"ip": "1.1.1.1"})),
            task("London, UK", json!({"city": "London"})),
        ]);
        let rows = rows(normalize(&raw));
        assert_eq!(rows[0].city, "N/A");
        assert_eq!(rows[0].coordinates_label, "N/A");
        assert_eq!(rows[1].status, RowStatus::Pending);
        assert_eq!(rows[1].ip, "N/A");
    }
}
