//! Logging hooks for the session
//!
//! The protocol result and the diagnostic channel are deliberately separate:
//! [`crate::Exchange`] carries the structured events, and this module lets a
//! front end additionally receive them as they happen. By default the logger
//! forwards to `tracing`; installing a callback redirects the lines to the
//! caller (a UI log pane, a test capture buffer).

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::frame::{ChecksumVerdict, RegisterValue};
use crate::transport::format_hex_packet;

/// Severity of a logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

/// Callback receiving formatted log lines.
pub type LogCallback = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Per-exchange logger used by the session.
///
/// Cloneable; clones share the same callback.
#[derive(Clone, Default)]
pub struct CallbackLogger {
    callback: Option<LogCallback>,
}

impl CallbackLogger {
    /// Logger that forwards everything to `tracing`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger that sends formatted lines to `callback` instead.
    pub fn with_callback(callback: LogCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    fn emit(&self, level: LogLevel, line: &str) {
        match &self.callback {
            Some(cb) => cb(level, line),
            None => match level {
                LogLevel::Debug => debug!("{}", line),
                LogLevel::Info => info!("{}", line),
                LogLevel::Warn => warn!("{}", line),
            },
        }
    }

    /// Log an outgoing request frame.
    pub fn log_request(&self, frame: &[u8]) {
        self.emit(
            LogLevel::Info,
            &format!("WRITE > {}", format_hex_packet(frame)),
        );
    }

    /// Log a received response frame.
    pub fn log_response(&self, frame: &[u8]) {
        self.emit(
            LogLevel::Info,
            &format!("RX RAW> {}", format_hex_packet(frame)),
        );
    }

    /// Log the checksum verdict for a response.
    pub fn log_checksum(&self, verdict: ChecksumVerdict) {
        let level = if verdict.is_ok() {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        };
        self.emit(level, &format!("CRC: {}", verdict));
    }

    /// Log the decoded value.
    pub fn log_value(&self, value: &RegisterValue) {
        self.emit(
            LogLevel::Info,
            &format!("Parsed {}: {}", value.type_name(), value),
        );
    }
}

impl std::fmt::Debug for CallbackLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackLogger")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
