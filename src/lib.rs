// src/lib.rs
//! Navigation Monitor Library
//!
//! Reads NMEA-0183 sentences from a serial port or TCP link, merges position,
//! speed and heading into one "last known" record, and serves it as JSON.

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod monitor;
pub mod nav;
pub mod nmea;
pub mod web;

// Re-export main types for convenience
pub use error::{NavError, Result};
pub use export::Snapshot;
pub use monitor::{LinkSource, NavMonitor};
pub use nav::{NavStore, NavigationFix};
