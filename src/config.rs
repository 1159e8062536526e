// src/config.rs
//! Configuration management

use crate::error::{NavError, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

/// Where NMEA bytes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Serial,
    Tcp,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Serial => write!(f, "serial"),
            SourceType::Tcp => write!(f, "tcp"),
        }
    }
}

/// What the ingestion task does with inbound bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Frame and parse NMEA sentences (a SeaTalk converter upstream is assumed)
    Nmea,
    /// Only keep a hex capture of each chunk, for checking the wiring
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub source_type: SourceType,
    pub serial_port: Option<String>,
    pub serial_baudrate: u32,
    pub tcp_host: String,
    pub tcp_port: u16,
    pub mode: CaptureMode,
    pub http_host: String,
    pub http_port: u16,
    pub read_chunk_size: usize,
    pub max_line_length: usize,
    pub reconnect_delay_ms: u64,
    pub status_interval_secs: u64,
    pub log_level: String,
    pub log_directory: Option<String>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            source_type: SourceType::Serial,
            serial_port: None,
            serial_baudrate: 4800,
            tcp_host: "localhost".to_string(),
            tcp_port: 10110,
            mode: CaptureMode::Nmea,
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            read_chunk_size: 512,
            max_line_length: 1024,
            reconnect_delay_ms: 2000,
            status_interval_secs: 30,
            log_level: "info".to_string(),
            log_directory: None,
        }
    }
}

impl NavConfig {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            NavError::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            NavError::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })
    }

    /// Save to `path`, or to the default location when `None`
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(config_path)
    }

    /// Default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| NavError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("nav-monitor")
            .join("config.json"))
    }

    /// Reject settings the ingestion task cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.read_chunk_size == 0 {
            return Err(NavError::Config("read_chunk_size must be non-zero".to_string()));
        }
        if self.max_line_length == 0 {
            return Err(NavError::Config("max_line_length must be non-zero".to_string()));
        }
        if self.source_type == SourceType::Serial
            && self.serial_port.as_deref().map_or(true, str::is_empty)
        {
            return Err(NavError::Config(
                "serial source selected but no serial_port configured".to_string(),
            ));
        }
        if self.source_type == SourceType::Tcp && self.tcp_host.is_empty() {
            return Err(NavError::Config("tcp source selected but tcp_host is empty".to_string()));
        }
        Ok(())
    }

    /// Update serial port settings
    pub fn update_serial(&mut self, port: String, baudrate: u32) {
        self.source_type = SourceType::Serial;
        self.serial_port = Some(port);
        self.serial_baudrate = baudrate;
    }

    /// Update TCP source settings
    pub fn update_tcp(&mut self, host: String, port: u16) {
        self.source_type = SourceType::Tcp;
        self.tcp_host = host;
        self.tcp_port = port;
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn status_interval(&self) -> Option<Duration> {
        (self.status_interval_secs > 0).then(|| Duration::from_secs(self.status_interval_secs))
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NavConfig::default();
        assert_eq!(config.source_type, SourceType::Serial);
        assert_eq!(config.serial_baudrate, 4800);
        assert_eq!(config.mode, CaptureMode::Nmea);
        assert_eq!(config.http_addr(), "0.0.0.0:8080");
        assert_eq!(config.status_interval(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_update_serial() {
        let mut config = NavConfig::default();
        config.update_tcp("mux.local".to_string(), 2000);
        config.update_serial("/dev/ttyUSB0".to_string(), 38400);
        assert_eq!(config.source_type, SourceType::Serial);
        assert_eq!(config.serial_port, Some("/dev/ttyUSB0".to_string()));
        assert_eq!(config.serial_baudrate, 38400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = NavConfig::default();
        assert!(matches!(config.validate(), Err(NavError::Config(_))));

        let mut config = NavConfig::default();
        config.update_tcp("mux.local".to_string(), 10110);
        assert!(config.validate().is_ok());

        config.max_line_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: NavConfig =
            serde_json::from_str(r#"{"source_type":"tcp","tcp_host":"10.0.0.5","mode":"raw"}"#)
                .unwrap();
        assert_eq!(config.source_type, SourceType::Tcp);
        assert_eq!(config.tcp_host, "10.0.0.5");
        assert_eq!(config.tcp_port, 10110);
        assert_eq!(config.mode, CaptureMode::Raw);
        assert_eq!(config.read_chunk_size, 512);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("nav-monitor-test-{}", std::process::id()));
        let path = dir.join("config.json");

        let mut config = NavConfig::default();
        config.update_serial("/dev/ttyAMA0".to_string(), 4800);
        config.status_interval_secs = 0;
        config.save(Some(path.as_path())).unwrap();

        let loaded = NavConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.status_interval(), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("nav-monitor-does-not-exist.json");
        assert_eq!(NavConfig::load(Some(path.as_path())).unwrap(), NavConfig::default());
    }
}
