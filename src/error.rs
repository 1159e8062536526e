// src/error.rs
//! Errors raised while setting up links, config, logging and the HTTP server
//!
//! Per-line problems in the NMEA stream are not errors at this level; see
//! [`crate::nmea::SentenceError`] and friends.

use std::fmt;

pub type Result<T> = std::result::Result<T, NavError>;

#[derive(Debug)]
pub enum NavError {
    Io(std::io::Error),
    /// Serial port could not be opened or enumerated
    Serial(tokio_serial::Error),
    Json(serde_json::Error),
    /// TCP link or HTTP listener could not be established
    Connection(String),
    Config(String),
    Logging(String),
    Server(String),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::Io(e) => write!(f, "I/O failure: {}", e),
            NavError::Serial(e) => write!(f, "serial port: {}", e),
            NavError::Json(e) => write!(f, "JSON: {}", e),
            NavError::Connection(msg) => write!(f, "connection: {}", msg),
            NavError::Config(msg) => write!(f, "configuration: {}", msg),
            NavError::Logging(msg) => write!(f, "logging setup: {}", msg),
            NavError::Server(msg) => write!(f, "HTTP server: {}", msg),
        }
    }
}

impl std::error::Error for NavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NavError::Io(e) => Some(e),
            NavError::Serial(e) => Some(e),
            NavError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NavError {
    fn from(error: std::io::Error) -> Self {
        NavError::Io(error)
    }
}

impl From<tokio_serial::Error> for NavError {
    fn from(error: tokio_serial::Error) -> Self {
        NavError::Serial(error)
    }
}

impl From<serde_json::Error> for NavError {
    fn from(error: serde_json::Error) -> Self {
        NavError::Json(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = NavError::Connection("port busy".to_string());
        assert_eq!(err.to_string(), "connection: port busy");

        let err = NavError::Config("max_line_length must be non-zero".to_string());
        assert_eq!(err.to_string(), "configuration: max_line_length must be non-zero");
    }

    #[test]
    fn test_io_conversion_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: NavError = io.into();
        assert!(matches!(err, NavError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_serial_conversion() {
        fn open() -> Result<()> {
            Err(tokio_serial::Error::new(
                tokio_serial::ErrorKind::NoDevice,
                "/dev/ttyUSB9 not present",
            ))?
        }

        let err = open().unwrap_err();
        assert!(matches!(err, NavError::Serial(_)));
        assert!(err.to_string().starts_with("serial port: "));
        assert!(err.to_string().contains("/dev/ttyUSB9"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
