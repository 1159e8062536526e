// src/monitor.rs
//! Link input and the ingestion pipeline
//!
//! bytes → [`LineFramer`] → [`parse_sentence`] → [`NavStore::apply`]

use crate::{
    config::{CaptureMode, NavConfig, SourceType},
    error::{NavError, Result},
    nav::{NavStore, NavigationFix},
    nmea::{parse_sentence, LineFramer, RawLine, Sentence, SentenceError},
};
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    net::TcpStream,
    task::JoinHandle,
    time::{sleep, timeout},
};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, trace, warn};

/// How long a read may sit idle before the running flag is checked again
const IDLE_POLL: Duration = Duration::from_millis(250);

/// NMEA byte source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSource {
    Serial { port: String, baudrate: u32 },
    Tcp { host: String, port: u16 },
}

impl LinkSource {
    pub fn from_config(config: &NavConfig) -> Result<Self> {
        match config.source_type {
            SourceType::Serial => {
                let port = config.serial_port.clone().ok_or_else(|| {
                    NavError::Config("serial source selected but no serial_port configured".to_string())
                })?;
                Ok(LinkSource::Serial {
                    port,
                    baudrate: config.serial_baudrate,
                })
            }
            SourceType::Tcp => Ok(LinkSource::Tcp {
                host: config.tcp_host.clone(),
                port: config.tcp_port,
            }),
        }
    }
}

impl fmt::Display for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkSource::Serial { port, baudrate } => write!(f, "serial {} @ {} baud", port, baudrate),
            LinkSource::Tcp { host, port } => write!(f, "tcp {}:{}", host, port),
        }
    }
}

type Link = Box<dyn AsyncRead + Send + Unpin>;

async fn open_link(source: &LinkSource) -> Result<Link> {
    match source {
        LinkSource::Serial { port, baudrate } => {
            let serial = tokio_serial::new(port, *baudrate)
                .timeout(Duration::from_millis(1000))
                .open_native_async()?;
            Ok(Box::new(serial))
        }
        LinkSource::Tcp { host, port } => {
            let stream = TcpStream::connect((host.as_str(), *port))
                .await
                .map_err(|e| NavError::Connection(format!("Failed to connect to {}:{}: {}", host, port, e)))?;
            Ok(Box::new(stream))
        }
    }
}

/// Per-line outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Non-empty lines seen
    pub lines: u64,
    /// Sentences that wrote at least one field
    pub applied: u64,
    /// Well-formed sentences with nothing to write
    pub ignored: u64,
    /// Undecodable or malformed lines
    pub rejected: u64,
    pub overflows: u64,
}

impl IngestStats {
    pub fn merge(&mut self, other: &IngestStats) {
        self.lines += other.lines;
        self.applied += other.applied;
        self.ignored += other.ignored;
        self.rejected += other.rejected;
        self.overflows += other.overflows;
    }
}

/// Turns inbound chunks into store updates. The only writer of a [`NavStore`].
#[derive(Debug)]
pub struct Ingestor {
    store: NavStore,
    framer: LineFramer,
    mode: CaptureMode,
    totals: IngestStats,
}

impl Ingestor {
    pub fn new(store: NavStore, mode: CaptureMode, max_line_length: usize) -> Self {
        Self {
            store,
            framer: LineFramer::new(max_line_length),
            mode,
            totals: IngestStats::default(),
        }
    }

    /// Process one chunk read from the link
    pub fn ingest_chunk(&mut self, chunk: &[u8]) -> IngestStats {
        let mut stats = IngestStats::default();
        if chunk.is_empty() {
            return stats;
        }

        if self.mode == CaptureMode::Raw {
            self.store.capture_raw(chunk, true);
            return stats;
        }

        self.store.capture_raw(chunk, false);
        for frame in self.framer.push(chunk) {
            match frame {
                Ok(line) => self.ingest_line(&line, &mut stats),
                Err(e) => {
                    warn!(error = %e, "Dropping oversized input");
                    stats.overflows += 1;
                }
            }
        }

        self.totals.merge(&stats);
        stats
    }

    fn ingest_line(&self, line: &RawLine, stats: &mut IngestStats) {
        let text = match line.decode() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, len = line.as_bytes().len(), "Dropping undecodable line");
                stats.rejected += 1;
                return;
            }
        };
        if text.is_empty() {
            return;
        }
        stats.lines += 1;

        match parse_sentence(text) {
            Ok(Sentence::Unsupported(code)) => {
                trace!(%code, "Ignoring unsupported sentence");
                stats.ignored += 1;
            }
            Ok(sentence) => {
                if self.store.apply(&sentence.to_update()) {
                    stats.applied += 1;
                } else {
                    trace!(kind = sentence.kind(), "Sentence carried no usable fields");
                    stats.ignored += 1;
                }
            }
            Err(SentenceError::NoStartMarker) => {
                debug!(line = text, "Skipping line without start marker");
                stats.rejected += 1;
            }
            Err(e) => {
                warn!(error = %e, line = text, "NMEA parse error");
                stats.rejected += 1;
            }
        }
    }

    /// Forget any partial line, e.g. after the link was reopened
    pub fn reset(&mut self) {
        self.framer.clear();
    }

    pub fn totals(&self) -> IngestStats {
        self.totals
    }
}

/// Settings for the ingestion task
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub mode: CaptureMode,
    pub read_chunk_size: usize,
    pub max_line_length: usize,
    pub reconnect_delay: Duration,
}

impl From<&NavConfig> for IngestSettings {
    fn from(config: &NavConfig) -> Self {
        Self {
            mode: config.mode,
            read_chunk_size: config.read_chunk_size,
            max_line_length: config.max_line_length,
            reconnect_delay: config.reconnect_delay(),
        }
    }
}

/// Owns the navigation store and drives ingestion from a link
pub struct NavMonitor {
    store: NavStore,
    running: Arc<AtomicBool>,
    settings: IngestSettings,
}

impl NavMonitor {
    pub fn new(settings: IngestSettings) -> Self {
        Self {
            store: NavStore::new(),
            running: Arc::new(AtomicBool::new(true)),
            settings,
        }
    }

    pub fn from_config(config: &NavConfig) -> Self {
        Self::new(IngestSettings::from(config))
    }

    /// Handle for readers (HTTP handlers, status log)
    pub fn store(&self) -> NavStore {
        self.store.clone()
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Spawn the ingestion task. The link is reopened after errors until
    /// [`NavMonitor::stop`] is called.
    pub fn start(&self, source: LinkSource) -> JoinHandle<()> {
        let ingestor = Ingestor::new(
            self.store.clone(),
            self.settings.mode,
            self.settings.max_line_length,
        );
        let running = Arc::clone(&self.running);
        let settings = self.settings.clone();

        tokio::spawn(run_link(source, ingestor, running, settings))
    }

    /// Stop the monitor
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Stop the monitor and wait up to `grace` for the ingestion task.
    /// Returns whether it finished cleanly.
    pub async fn shutdown(&self, ingest: JoinHandle<()>, grace: Duration) -> bool {
        self.stop();
        match timeout(grace, ingest).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Ingestion task failed");
                false
            }
            Err(_) => {
                warn!(grace_ms = grace.as_millis() as u64, "Ingestion task did not stop in time");
                false
            }
        }
    }

    /// Check if the monitor is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Get a copy of the current fix
    pub fn get_data(&self) -> NavigationFix {
        self.store.snapshot()
    }
}

async fn run_link(
    source: LinkSource,
    mut ingestor: Ingestor,
    running: Arc<AtomicBool>,
    settings: IngestSettings,
) {
    let mut buf = vec![0u8; settings.read_chunk_size.max(1)];

    while running.load(Ordering::Relaxed) {
        match open_link(&source).await {
            Ok(mut link) => {
                info!(%source, mode = ?settings.mode, "Link up");
                ingestor.reset();
                read_link(&mut link, &mut buf, &mut ingestor, &running).await;
                let totals = ingestor.totals();
                info!(
                    %source,
                    lines = totals.lines,
                    applied = totals.applied,
                    rejected = totals.rejected,
                    "Link down"
                );
            }
            Err(e) => warn!(%source, error = %e, "Link unavailable"),
        }

        if !running.load(Ordering::Relaxed) {
            break;
        }
        sleep(settings.reconnect_delay).await;
    }

    debug!(%source, "Ingestion task stopped");
}

async fn read_link(link: &mut Link, buf: &mut [u8], ingestor: &mut Ingestor, running: &AtomicBool) {
    while running.load(Ordering::Relaxed) {
        match timeout(IDLE_POLL, link.read(buf)).await {
            // idle, no data yet
            Err(_) => continue,
            Ok(Ok(0)) => {
                warn!("Link closed by peer");
                return;
            }
            Ok(Ok(n)) => {
                let stats = ingestor.ingest_chunk(&buf[..n]);
                trace!(bytes = n, ?stats, "Chunk ingested");
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Ok(Err(e)) => {
                warn!(error = %e, "Error reading from link");
                return;
            }
        }
    }
}

/// Periodically log the current fix until `running` is cleared
pub async fn run_status_log(store: NavStore, running: Arc<AtomicBool>, interval: Duration) {
    let stale_after = (interval.as_secs() as i64 * 2).max(10);

    while running.load(Ordering::Relaxed) {
        sleep(interval).await;

        let fix = store.snapshot();
        if !fix.is_recent(stale_after) {
            warn!(age_secs = ?fix.age_seconds(), "No fresh navigation data");
            continue;
        }
        info!(
            lat = %NavigationFix::format_coordinate(fix.latitude),
            lon = %NavigationFix::format_coordinate(fix.longitude),
            speed = %NavigationFix::format_value(fix.speed_knots, "kn"),
            heading = %NavigationFix::format_value(fix.heading_degrees, "deg"),
            has_fix = fix.has_fix(),
            "Status"
        );
    }
}

/// List available serial ports
pub fn list_serial_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}
