//! Core error types and result handling
//!
//! Every fallible operation in this crate returns [`AqtResult`], so callers
//! can pattern-match on the failure kind instead of catching panics. All
//! errors are scoped to a single read: none of them invalidate the session
//! itself, although transport-level failures mean the connection may be dead
//! and the caller should disconnect and reconnect.

use thiserror::Error;

/// Result type used throughout the crate.
pub type AqtResult<T> = Result<T, AqtError>;

/// Errors produced by the AQT Modbus client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AqtError {
    /// The supplied command string is not valid hexadecimal or has odd length.
    #[error("Malformed command: {message}")]
    MalformedCommand { message: String },

    /// Failed to establish or maintain the TCP connection.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Socket-level read/write failure. The connection should be considered
    /// dead after this; reconnect before retrying.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// No response within the configured deadline.
    #[error("Timeout during {operation} after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Response frame is too short to contain its declared payload.
    #[error("Short frame: need at least {expected} bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },

    /// Response CRC does not match the computed value. Only surfaced as an
    /// error under [`ChecksumPolicy::Strict`](crate::frame::ChecksumPolicy);
    /// the lenient policy reports the mismatch as an advisory verdict.
    #[error("Checksum mismatch: received 0x{received:04X}, calculated 0x{calculated:04X}")]
    ChecksumMismatch { received: u16, calculated: u16 },

    /// A read was attempted with no open transport.
    #[error("Not connected")]
    NotConnected,
}

impl AqtError {
    /// Create a malformed-command error.
    pub fn malformed_command<S: Into<String>>(message: S) -> Self {
        AqtError::MalformedCommand {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection<S: Into<String>>(message: S) -> Self {
        AqtError::Connection {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io<S: Into<String>>(message: S) -> Self {
        AqtError::Io {
            message: message.into(),
        }
    }

    /// Create a timeout error for the given operation.
    pub fn timeout<S: Into<String>>(operation: S, timeout_ms: u64) -> Self {
        AqtError::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Whether this error indicates the underlying connection is unusable.
    pub fn is_fatal_to_connection(&self) -> bool {
        matches!(
            self,
            AqtError::Connection { .. } | AqtError::Io { .. } | AqtError::Timeout { .. }
        )
    }
}
