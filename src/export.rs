// src/export.rs
//! JSON snapshot of the navigation store

use crate::nav::{NavStore, NavigationFix};
use serde::Serialize;

/// Response payload served on `/data`. Unset values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub speed_kn: Option<f64>,
    pub heading: Option<f64>,
    pub raw_hex: Option<String>,
    /// Seconds since the UNIX epoch
    pub last_update: Option<f64>,
}

impl From<&NavigationFix> for Snapshot {
    fn from(fix: &NavigationFix) -> Self {
        Self {
            lat: fix.latitude,
            lon: fix.longitude,
            speed_kn: fix.speed_knots,
            heading: fix.heading_degrees,
            raw_hex: fix.raw_debug.as_deref().map(hex_bytes),
            last_update: fix
                .last_update
                .map(|ts| ts.timestamp_millis() as f64 / 1000.0),
        }
    }
}

/// Read the store once and build the payload
pub fn snapshot(store: &NavStore) -> Snapshot {
    Snapshot::from(&store.snapshot())
}

/// Uppercase hex pairs separated by single spaces, e.g. `24 47 50`
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{FieldUpdate, FixUpdate};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    #[test]
    fn test_empty_store_serializes_nulls() {
        let store = NavStore::new();
        let value: Value = serde_json::to_value(snapshot(&store)).unwrap();
        assert_eq!(
            value,
            json!({
                "lat": null,
                "lon": null,
                "speed_kn": null,
                "heading": null,
                "raw_hex": null,
                "last_update": null
            })
        );
    }

    #[test]
    fn test_populated_snapshot() {
        let mut fix = NavigationFix::new();
        fix.latitude = Some(-33.5);
        fix.longitude = Some(151.25);
        fix.heading_degrees = Some(270.0);
        fix.raw_debug = Some(vec![0x24, 0x0a, 0xff]);
        fix.last_update = Some(Utc.timestamp_millis_opt(1_700_000_000_250).unwrap());

        let value = serde_json::to_value(Snapshot::from(&fix)).unwrap();
        assert_eq!(
            value,
            json!({
                "lat": -33.5,
                "lon": 151.25,
                "speed_kn": null,
                "heading": 270.0,
                "raw_hex": "24 0A FF",
                "last_update": 1_700_000_000.25
            })
        );
    }

    #[test]
    fn test_snapshot_reads_store() {
        let store = NavStore::new();
        store.apply(&FixUpdate {
            speed_knots: FieldUpdate::Set(5.5),
            ..Default::default()
        });
        let snap = snapshot(&store);
        assert_eq!(snap.speed_kn, Some(5.5));
        assert!(snap.lat.is_none());
        assert!(snap.last_update.is_some());
    }

    #[test]
    fn test_hex_bytes() {
        assert_eq!(hex_bytes(b""), "");
        assert_eq!(hex_bytes(b"$GP\r\n"), "24 47 50 0D 0A");
    }
}
