// src/main.rs
//! Navigation Monitor - NMEA-0183 to JSON over HTTP

use anyhow::Context;
use clap::Parser;
use nav_monitor::{
    config::{CaptureMode, NavConfig, SourceType},
    logging::init_logging,
    monitor::{self, LinkSource, NavMonitor},
    web::start_web_server,
};
use std::{path::PathBuf, sync::atomic::Ordering, time::Duration};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "nav-monitor", version, about = "Serve the latest NMEA position, speed and heading as JSON")]
struct Cli {
    /// Configuration file (defaults to ~/.config/nav-monitor/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where NMEA data comes from
    #[arg(long, value_enum)]
    source: Option<SourceType>,

    /// Serial device, e.g. /dev/ttyUSB0
    #[arg(short = 'p', long)]
    serial_port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// NMEA-over-TCP host
    #[arg(long)]
    tcp_host: Option<String>,

    /// NMEA-over-TCP port
    #[arg(long)]
    tcp_port: Option<u16>,

    /// Parse NMEA or only capture raw bytes
    #[arg(short, long, value_enum)]
    mode: Option<CaptureMode>,

    /// HTTP listen address
    #[arg(long)]
    http_host: Option<String>,

    /// HTTP listen port
    #[arg(long)]
    http_port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Cli {
    /// Command line values win over the config file
    fn apply(&self, config: &mut NavConfig) {
        if let Some(port) = &self.serial_port {
            config.update_serial(port.clone(), self.baud.unwrap_or(config.serial_baudrate));
        } else if let Some(baud) = self.baud {
            config.serial_baudrate = baud;
        }
        if let Some(host) = &self.tcp_host {
            config.update_tcp(host.clone(), self.tcp_port.unwrap_or(config.tcp_port));
        } else if let Some(port) = self.tcp_port {
            config.tcp_port = port;
        }
        // an explicit --source beats the one implied by --serial-port/--tcp-host
        if let Some(source) = self.source {
            config.source_type = source;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(host) = &self.http_host {
            config.http_host = host.clone();
        }
        if let Some(port) = self.http_port {
            config.http_port = port;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_ports {
        monitor::list_serial_ports()?;
        return Ok(());
    }

    let mut config = NavConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    init_logging(&config.log_level, config.log_directory.as_deref())?;

    if cli.save_config {
        let path = config.save(cli.config.as_deref()).context("saving configuration")?;
        info!(path = %path.display(), "Configuration saved");
    }

    let source = LinkSource::from_config(&config)?;
    info!(%source, mode = ?config.mode, "Starting navigation monitor");

    let monitor = NavMonitor::from_config(&config);
    let ingest = monitor.start(source);

    if let Some(interval) = config.status_interval() {
        tokio::spawn(monitor::run_status_log(monitor.store(), monitor.running(), interval));
    }

    let running = monitor.running();
    let shutdown = async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down...");
        }
        running.store(false, Ordering::Relaxed);
    };

    start_web_server(monitor.store(), &config.http_addr(), shutdown).await?;

    monitor.shutdown(ingest, Duration::from_secs(2)).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "nav-monitor",
            "--serial-port",
            "/dev/ttyUSB1",
            "--baud",
            "38400",
            "--mode",
            "raw",
            "--http-port",
            "9000",
        ]);
        let mut config = NavConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.source_type, SourceType::Serial);
        assert_eq!(config.serial_port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(config.serial_baudrate, 38400);
        assert_eq!(config.mode, CaptureMode::Raw);
        assert_eq!(config.http_port, 9000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_tcp_source() {
        let cli = Cli::parse_from(["nav-monitor", "--tcp-host", "10.0.0.2"]);
        let mut config = NavConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.source_type, SourceType::Tcp);
        assert_eq!(config.tcp_host, "10.0.0.2");
        assert_eq!(config.tcp_port, 10110);
    }

    #[test]
    fn test_explicit_source_wins() {
        let cli = Cli::parse_from([
            "nav-monitor",
            "--source",
            "tcp",
            "--serial-port",
            "/dev/ttyUSB0",
        ]);
        let mut config = NavConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.source_type, SourceType::Tcp);
        assert_eq!(config.serial_port.as_deref(), Some("/dev/ttyUSB0"));

        let cli = Cli::parse_from(["nav-monitor", "--source", "serial", "--tcp-host", "mux.local"]);
        let mut config = NavConfig::default();
        config.serial_port = Some("/dev/ttyAMA0".to_string());
        cli.apply(&mut config);

        assert_eq!(config.source_type, SourceType::Serial);
        assert_eq!(config.tcp_host, "mux.local");
        assert!(config.validate().is_ok());
    }
}
