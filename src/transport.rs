//! TCP transport for the transmitter link
//!
//! The transmitter sits behind a serial-to-TCP gateway, so the link is a
//! plain byte stream with no framing guarantee: a single read may return a
//! partial response. [`TcpTransport::recv_frame`] therefore reads the
//! 3-byte response header first, derives the total frame length from the
//! declared byte count, and then reads exactly the remaining
//! `byte_count + 2` bytes.
//!
//! If the peer closes or goes quiet mid-frame, the bytes accumulated so far
//! are returned and the decoder reports the short frame; only a reply that
//! never starts is a [`Timeout`](crate::AqtError::Timeout).

use std::future::Future;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

use crate::config::LinkConfig;
use crate::constants::{CRC_LEN, MAX_FRAME_SIZE, RESPONSE_HEADER_LEN};
use crate::error::{AqtError, AqtResult};

/// Format raw bytes as a spaced hex string for packet logging.
pub fn format_hex_packet(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Log a packet with its direction.
fn log_packet(direction: &str, data: &[u8]) {
    info!("[AQT-TCP] {} {}", direction, format_hex_packet(data));
}

/// Transport layer statistics.
#[derive(Debug, Clone, Default)]
pub struct TransportStats {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Byte-stream transport abstraction for the request/response exchange.
///
/// The session drives this trait; [`TcpTransport`] is the production
/// implementation and tests substitute a mock. All methods take `&mut self`:
/// the protocol allows a single outstanding request per connection, and
/// exclusive access enforces that without locks.
pub trait Transport: Send + Sync {
    /// Transmit a complete request frame.
    fn send_frame(&mut self, frame: &[u8]) -> impl Future<Output = AqtResult<()>> + Send;

    /// Receive one logical response frame.
    ///
    /// May return fewer bytes than a well-formed frame when the peer closes
    /// or stalls mid-reply; the decoder is responsible for rejecting short
    /// frames.
    fn recv_frame(&mut self) -> impl Future<Output = AqtResult<Vec<u8>>> + Send;

    /// Whether the transport currently holds a connection.
    fn is_connected(&self) -> bool;

    /// Close the connection gracefully.
    fn close(&mut self) -> impl Future<Output = AqtResult<()>> + Send;

    /// Get communication statistics.
    fn get_stats(&self) -> TransportStats;
}

/// TCP transport to the transmitter gateway.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    /// Peer description for log messages ("host:port").
    peer: String,
    response_timeout: Duration,
    response_delay: Duration,
    stats: TransportStats,
    /// Enable hex packet logging for debugging.
    packet_logging: bool,
}

impl TcpTransport {
    /// Open a connection to `host:port` with the configured connect timeout.
    pub async fn connect(host: &str, port: u16, config: &LinkConfig) -> AqtResult<Self> {
        let peer = format!("{}:{}", host, port);
        let stream = timeout(config.connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| {
                AqtError::timeout("connect", config.connect_timeout.as_millis() as u64)
            })?
            .map_err(|e| AqtError::connection(format!("Failed to connect to {}: {}", peer, e)))?;

        debug!("Connected to {}", peer);
        Ok(Self {
            stream: Some(stream),
            peer,
            response_timeout: config.response_timeout,
            response_delay: config.response_delay,
            stats: TransportStats::default(),
            packet_logging: false,
        })
    }

    /// Enable or disable hex packet logging.
    pub fn set_packet_logging(&mut self, enabled: bool) {
        self.packet_logging = enabled;
    }

    /// Peer description ("host:port").
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Accumulate bytes until `buf` holds `target` bytes.
    ///
    /// Returns `Ok(true)` when the target was reached, `Ok(false)` on a
    /// clean peer close before that.
    async fn fill_to(stream: &mut TcpStream, buf: &mut BytesMut, target: usize) -> std::io::Result<bool> {
        while buf.len() < target {
            let n = stream.read_buf(buf).await?;
            if n == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Read up to `target` bytes into `buf` under the response timeout.
    ///
    /// Distinguishes three outcomes: target reached; peer closed early
    /// (partial bytes stand); nothing at all within the deadline (timeout).
    async fn read_phase(&mut self, buf: &mut BytesMut, target: usize) -> AqtResult<Phase> {
        let stream = self
            .stream
            .as_mut()
            .ok_or(AqtError::NotConnected)?;

        match timeout(self.response_timeout, Self::fill_to(stream, buf, target)).await {
            Ok(Ok(true)) => Ok(Phase::Complete),
            Ok(Ok(false)) => {
                // Peer closed; the connection is finished either way.
                self.stream = None;
                if buf.is_empty() {
                    self.stats.errors += 1;
                    Err(AqtError::io(format!("Connection closed by {}", self.peer)))
                } else {
                    Ok(Phase::Truncated)
                }
            }
            Ok(Err(e)) => {
                self.stream = None;
                self.stats.errors += 1;
                Err(AqtError::io(format!("Socket read failed: {}", e)))
            }
            Err(_) => {
                if buf.is_empty() {
                    self.stream = None;
                    self.stats.timeouts += 1;
                    self.stats.errors += 1;
                    Err(AqtError::timeout(
                        "read response",
                        self.response_timeout.as_millis() as u64,
                    ))
                } else {
                    // Inactivity after partial data: treat as end-of-frame
                    // and let the decoder judge what arrived.
                    Ok(Phase::Truncated)
                }
            }
        }
    }
}

/// Outcome of one read phase.
enum Phase {
    Complete,
    Truncated,
}

impl Transport for TcpTransport {
    async fn send_frame(&mut self, frame: &[u8]) -> AqtResult<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or(AqtError::NotConnected)?;

        if self.packet_logging {
            log_packet("send", frame);
        }

        match timeout(self.response_timeout, stream.write_all(frame)).await {
            Ok(Ok(())) => {
                self.stats.requests_sent += 1;
                self.stats.bytes_sent += frame.len() as u64;
                Ok(())
            }
            Ok(Err(e)) => {
                self.stream = None;
                self.stats.errors += 1;
                Err(AqtError::io(format!("Socket write failed: {}", e)))
            }
            Err(_) => {
                self.stream = None;
                self.stats.timeouts += 1;
                self.stats.errors += 1;
                Err(AqtError::timeout(
                    "send request",
                    self.response_timeout.as_millis() as u64,
                ))
            }
        }
    }

    async fn recv_frame(&mut self) -> AqtResult<Vec<u8>> {
        // Give the gateway a moment to forward the reply. Courtesy only;
        // the length-driven read below is what guarantees a full frame.
        if !self.response_delay.is_zero() {
            sleep(self.response_delay).await;
        }

        // A frame is bounded by the u8 byte count: 3 + 255 + 2 bytes.
        let mut buf = BytesMut::with_capacity(MAX_FRAME_SIZE + 8);

        // Phase 1: header (address, function, byte count).
        if let Phase::Truncated = self.read_phase(&mut buf, RESPONSE_HEADER_LEN).await? {
            self.stats.bytes_received += buf.len() as u64;
            return Ok(buf.to_vec());
        }

        // Phase 2: declared payload plus CRC trailer.
        let byte_count = buf[2] as usize;
        let total = RESPONSE_HEADER_LEN + byte_count + CRC_LEN;
        if let Phase::Truncated = self.read_phase(&mut buf, total).await? {
            self.stats.bytes_received += buf.len() as u64;
            return Ok(buf.to_vec());
        }

        self.stats.responses_received += 1;
        self.stats.bytes_received += buf.len() as u64;

        if self.packet_logging {
            log_packet("receive", &buf);
        }

        Ok(buf.to_vec())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn close(&mut self) -> AqtResult<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            debug!("Disconnected from {}", self.peer);
        }
        Ok(())
    }

    fn get_stats(&self) -> TransportStats {
        self.stats.clone()
    }
}
