// src/nav/data.rs
//! The merged "last known" navigation record

use chrono::{DateTime, Utc};

/// Latest navigation values, merged field by field from incoming sentences.
///
/// Every field starts unset. A field only changes when a sentence carries a
/// usable value for it (or, for RMC speed, an explicit empty value).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationFix {
    pub latitude: Option<f64>,        // signed decimal degrees
    pub longitude: Option<f64>,       // signed decimal degrees
    pub speed_knots: Option<f64>,
    pub heading_degrees: Option<f64>, // true heading / track
    pub raw_debug: Option<Vec<u8>>,   // most recent inbound chunk, never parsed
    pub last_update: Option<DateTime<Utc>>,
}

impl NavigationFix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if both coordinates are known
    pub fn has_fix(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Get the age of the last update in seconds
    pub fn age_seconds(&self) -> Option<i64> {
        self.last_update
            .map(|ts| Utc::now().signed_duration_since(ts).num_seconds())
    }

    /// Check if the record was updated within the last `max_age` seconds
    pub fn is_recent(&self, max_age: i64) -> bool {
        self.age_seconds().map_or(false, |age| age < max_age)
    }

    /// Format coordinate for log output
    pub fn format_coordinate(coord: Option<f64>) -> String {
        match coord {
            Some(val) => format!("{:.6}", val),
            None => "-".to_string(),
        }
    }

    /// Format value with unit for log output
    pub fn format_value(value: Option<f64>, unit: &str) -> String {
        match value {
            Some(val) => format!("{:.1} {}", val, unit),
            None => "-".to_string(),
        }
    }
}
