//! Session: connection lifecycle and the read-parameter pipeline
//!
//! An [`AqtSession`] owns at most one transport at a time and drives the
//! full exchange for a register read: build the frame, send it, receive the
//! reply, decode it. The session is the sole owner of the socket; callers
//! needing concurrency use one session per caller or external mutual
//! exclusion, matching the one-outstanding-request protocol.
//!
//! # Example
//!
//! ```rust,no_run
//! use aqt_modbus::{AqtSession, LinkConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut session = AqtSession::new(LinkConfig::new().with_host("192.168.0.7"));
//!     if session.connect().await {
//!         // Uptime register, 32-bit.
//!         match session.read_parameter("010300980002").await {
//!             Ok(exchange) => println!("{}", exchange.transcript()),
//!             Err(e) => eprintln!("read failed: {}", e),
//!         }
//!         session.disconnect().await;
//!     }
//! }
//! ```

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::config::LinkConfig;
use crate::error::{AqtError, AqtResult};
use crate::frame::{build_frame, decode_frame, ChecksumVerdict, RegisterValue};
use crate::logging::CallbackLogger;
use crate::transport::{format_hex_packet, TcpTransport, Transport, TransportStats};

/// One structured diagnostic event from an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeEvent {
    /// The request frame that was transmitted.
    FrameSent(Vec<u8>),
    /// The raw response frame as received.
    FrameReceived(Vec<u8>),
    /// CRC comparison outcome.
    Checksum(ChecksumVerdict),
    /// The decoded value.
    Decoded(RegisterValue),
}

/// A completed request/response exchange.
///
/// Carries the decoded value together with everything a front end needs to
/// render a diagnostic view: the exact bytes sent and received, the CRC
/// verdict, and the sampling timestamp. This replaces the reference
/// implementation's captured stdout with structured data.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// When the exchange completed.
    pub timestamp: DateTime<Local>,
    /// Request frame bytes, CRC included.
    pub sent: Vec<u8>,
    /// Response frame bytes as received.
    pub received: Vec<u8>,
    /// CRC comparison outcome for the response.
    pub checksum: ChecksumVerdict,
    /// The decoded register value.
    pub value: RegisterValue,
}

impl Exchange {
    /// The exchange as an ordered event list.
    pub fn events(&self) -> Vec<ExchangeEvent> {
        vec![
            ExchangeEvent::FrameSent(self.sent.clone()),
            ExchangeEvent::FrameReceived(self.received.clone()),
            ExchangeEvent::Checksum(self.checksum),
            ExchangeEvent::Decoded(self.value.clone()),
        ]
    }

    /// Human-readable transcript of the exchange, one line per event.
    pub fn transcript(&self) -> String {
        format!(
            "Sampled: {}\nWRITE > {}\nRX RAW> {}\nCRC: {}\nParsed {}: {}",
            self.timestamp.format("%d-%m-%y %H:%M:%S"),
            format_hex_packet(&self.sent),
            format_hex_packet(&self.received),
            self.checksum,
            self.value.type_name(),
            self.value,
        )
    }
}

/// Client session for a transmitter.
///
/// Created unconnected; [`connect`](AqtSession::connect) establishes the
/// transport and may be called again to replace a prior connection,
/// [`disconnect`](AqtSession::disconnect) releases it and is safe to repeat.
/// Generic over [`Transport`] so tests can substitute a mock; production
/// code uses the [`TcpTransport`] default.
pub struct AqtSession<T: Transport = TcpTransport> {
    transport: Option<T>,
    config: LinkConfig,
    logger: Option<CallbackLogger>,
}

impl AqtSession<TcpTransport> {
    /// Create an unconnected session.
    pub fn new(config: LinkConfig) -> Self {
        Self {
            transport: None,
            config,
            logger: None,
        }
    }

    /// Connect to the configured host and port.
    ///
    /// Returns `false` (never errors) on any connection failure, leaving the
    /// session unconnected; the cause is logged. An existing connection is
    /// replaced.
    pub async fn connect(&mut self) -> bool {
        match self.try_connect().await {
            Ok(()) => {
                info!("Connected to {}:{}", self.config.host, self.config.port);
                true
            }
            Err(e) => {
                warn!(
                    "Connection to {}:{} failed: {}",
                    self.config.host, self.config.port, e
                );
                self.transport = None;
                false
            }
        }
    }

    /// Connect to an explicit host and port, updating the configuration.
    pub async fn connect_to(&mut self, host: &str, port: u16) -> bool {
        self.config.host = host.to_string();
        self.config.port = port;
        self.connect().await
    }

    /// Connect, surfacing the failure cause.
    pub async fn try_connect(&mut self) -> AqtResult<()> {
        let transport =
            TcpTransport::connect(&self.config.host, self.config.port, &self.config).await?;
        // Replaces (and thereby drops) any previous connection.
        self.transport = Some(transport);
        Ok(())
    }

    /// Enable hex packet logging on the underlying transport.
    pub fn set_packet_logging(&mut self, enabled: bool) {
        if let Some(transport) = self.transport.as_mut() {
            transport.set_packet_logging(enabled);
        }
    }
}

impl<T: Transport> AqtSession<T> {
    /// Create a session from an already-connected transport.
    pub fn from_transport(transport: T, config: LinkConfig) -> Self {
        Self {
            transport: Some(transport),
            config,
            logger: None,
        }
    }

    /// Install a logger receiving per-exchange diagnostic lines.
    pub fn set_logger(&mut self, logger: CallbackLogger) {
        self.logger = Some(logger);
    }

    /// The session configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Whether a transport is currently held and connected.
    pub fn is_open(&self) -> bool {
        self.transport
            .as_ref()
            .map(Transport::is_connected)
            .unwrap_or(false)
    }

    /// Release the transport. Safe to call repeatedly.
    pub async fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            let _ = transport.close().await;
        }
    }

    /// Transport statistics, if a transport is held.
    pub fn stats(&self) -> Option<TransportStats> {
        self.transport.as_ref().map(Transport::get_stats)
    }

    /// Read one register parameter.
    ///
    /// `command_hex` is the hex-encoded command body (address, function,
    /// register address, register count) without the CRC; the command table
    /// in [`crate::registers`] supplies these for known parameters.
    ///
    /// Fails fast with [`AqtError::NotConnected`] when no transport is open,
    /// without touching any socket. Each failure is scoped to this call; the
    /// session survives and may retry or reconnect.
    pub async fn read_parameter(&mut self, command_hex: &str) -> AqtResult<Exchange> {
        let transport = self.transport.as_mut().ok_or(AqtError::NotConnected)?;

        let frame = build_frame(command_hex)?;
        if let Some(logger) = &self.logger {
            logger.log_request(&frame);
        }

        transport.send_frame(&frame).await?;
        let received = transport.recv_frame().await?;
        if let Some(logger) = &self.logger {
            logger.log_response(&received);
        }

        let decoded = decode_frame(&received, self.config.checksum_policy)?;
        if let Some(logger) = &self.logger {
            logger.log_checksum(decoded.checksum);
            logger.log_value(&decoded.value);
        }

        Ok(Exchange {
            timestamp: Local::now(),
            sent: frame,
            received,
            checksum: decoded.checksum,
            value: decoded.value,
        })
    }

    /// Read one register parameter, returning only the decoded value.
    pub async fn read_value(&mut self, command_hex: &str) -> AqtResult<RegisterValue> {
        self.read_parameter(command_hex).await.map(|e| e.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::append_checksum;
    use std::collections::VecDeque;

    /// Mock transport with canned replies and request capture.
    struct MockTransport {
        sent: Vec<Vec<u8>>,
        replies: VecDeque<AqtResult<Vec<u8>>>,
        connected: bool,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                replies: VecDeque::new(),
                connected: true,
            }
        }

        fn with_reply(reply: AqtResult<Vec<u8>>) -> Self {
            let mut mock = Self::new();
            mock.replies.push_back(reply);
            mock
        }
    }

    impl Transport for MockTransport {
        async fn send_frame(&mut self, frame: &[u8]) -> AqtResult<()> {
            self.sent.push(frame.to_vec());
            Ok(())
        }

        async fn recv_frame(&mut self) -> AqtResult<Vec<u8>> {
            self.replies
                .pop_front()
                .unwrap_or_else(|| Err(AqtError::io("no reply prepared in mock")))
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn close(&mut self) -> AqtResult<()> {
            self.connected = false;
            Ok(())
        }

        fn get_stats(&self) -> TransportStats {
            TransportStats::default()
        }
    }

    fn uptime_reply() -> Vec<u8> {
        let mut frame = vec![0x01, 0x03, 0x04, 0x00, 0x00, 0x01, 0x2C];
        append_checksum(&mut frame);
        frame
    }

    #[tokio::test]
    async fn test_not_connected_fails_fast() {
        let mut session = AqtSession::new(LinkConfig::default());
        let err = session.read_parameter("010300980002").await.unwrap_err();
        assert_eq!(err, AqtError::NotConnected);
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_uptime_read() {
        let mock = MockTransport::with_reply(Ok(uptime_reply()));
        let mut session = AqtSession::from_transport(mock, LinkConfig::default());

        let exchange = session.read_parameter("010300980002").await.unwrap();
        assert_eq!(exchange.value, RegisterValue::U32(300));
        assert!(exchange.checksum.is_ok());

        // The transmitted frame is the command plus its CRC.
        let expected = build_frame("010300980002").unwrap();
        assert_eq!(exchange.sent, expected);
    }

    #[tokio::test]
    async fn test_malformed_command_sends_nothing() {
        let mock = MockTransport::new();
        let mut session = AqtSession::from_transport(mock, LinkConfig::default());

        let err = session.read_parameter("01030").await.unwrap_err();
        assert!(matches!(err, AqtError::MalformedCommand { .. }));
        // Session is still usable.
        assert!(session.is_open());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mock = MockTransport::with_reply(Err(AqtError::timeout("read response", 3000)));
        let mut session = AqtSession::from_transport(mock, LinkConfig::default());

        let err = session.read_parameter("010300000001").await.unwrap_err();
        assert!(matches!(err, AqtError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_short_reply_propagates_from_decoder() {
        let mock = MockTransport::with_reply(Ok(vec![0x01, 0x03, 0x04, 0x00]));
        let mut session = AqtSession::from_transport(mock, LinkConfig::default());

        let err = session.read_parameter("010300980002").await.unwrap_err();
        assert!(matches!(err, AqtError::ShortFrame { .. }));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let mock = MockTransport::new();
        let mut session = AqtSession::from_transport(mock, LinkConfig::default());
        assert!(session.is_open());

        session.disconnect().await;
        assert!(!session.is_open());
        session.disconnect().await;
        assert!(!session.is_open());

        let err = session.read_parameter("010300000001").await.unwrap_err();
        assert_eq!(err, AqtError::NotConnected);
    }

    #[tokio::test]
    async fn test_exchange_events_and_transcript() {
        let mock = MockTransport::with_reply(Ok(uptime_reply()));
        let mut session = AqtSession::from_transport(mock, LinkConfig::default());

        let exchange = session.read_parameter("010300980002").await.unwrap();
        let events = exchange.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], ExchangeEvent::FrameSent(exchange.sent.clone()));
        assert_eq!(events[2], ExchangeEvent::Checksum(ChecksumVerdict::Ok));
        assert_eq!(events[3], ExchangeEvent::Decoded(RegisterValue::U32(300)));

        let transcript = exchange.transcript();
        assert!(transcript.contains("WRITE > 01 03 00 98 00 02"));
        assert!(transcript.contains("RX RAW> 01 03 04 00 00 01 2C"));
        assert!(transcript.contains("CRC: OK"));
        assert!(transcript.contains("Parsed u32: 300"));
    }

    #[tokio::test]
    async fn test_logger_captures_exchange() {
        use crate::logging::{CallbackLogger, LogLevel};
        use std::sync::{Arc, Mutex};

        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let logger = CallbackLogger::with_callback(Arc::new(move |_: LogLevel, line: &str| {
            captured.lock().unwrap().push(line.to_string());
        }));

        let mock = MockTransport::with_reply(Ok(uptime_reply()));
        let mut session = AqtSession::from_transport(mock, LinkConfig::default());
        session.set_logger(logger);
        session.read_parameter("010300980002").await.unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("WRITE >"));
        assert!(lines[1].starts_with("RX RAW>"));
        assert_eq!(lines[2], "CRC: OK");
        assert_eq!(lines[3], "Parsed u32: 300");
    }
}
