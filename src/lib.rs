//! # AQT Modbus - Vaisala AQT560 Register Client
//!
//! An async Modbus RTU-over-TCP client for reading registers from an AQT560
//! air quality transmitter behind a serial-to-TCP gateway. The transmitter
//! speaks Modbus RTU; the gateway forwards the serial frames verbatim over a
//! TCP socket, so every frame carries its own CRC-16/MODBUS trailer.
//!
//! ## Features
//!
//! - **Async transport**: Tokio TCP with per-operation timeouts
//! - **RTU framing**: CRC-16/MODBUS generation and verification
//! - **Length-driven reads**: responses sized from the frame's own byte count
//! - **Typed decoding**: u16, u32 and ASCII registers dispatched by byte count
//! - **Structured exchanges**: every read returns the raw frames, CRC verdict
//!   and decoded value for diagnostics
//! - **Built-in register map**: the transmitter's parameter table ships with
//!   the crate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aqt_modbus::{AqtSession, LinkConfig, RegisterValue};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut session = AqtSession::new(LinkConfig::new().with_host("192.168.0.7"));
//!     if !session.connect().await {
//!         eprintln!("transmitter unreachable");
//!         return;
//!     }
//!
//!     // Uptime register, two 16-bit registers wide.
//!     match session.read_value("010300980002").await {
//!         Ok(RegisterValue::U32(seconds)) => println!("uptime: {} s", seconds),
//!         Ok(other) => println!("unexpected payload: {}", other),
//!         Err(e) => eprintln!("read failed: {}", e),
//!     }
//!
//!     session.disconnect().await;
//! }
//! ```

/// Core error types and result handling
pub mod error;

/// Protocol and deployment constants
pub mod constants;

/// CRC-16/MODBUS computation
pub mod checksum;

/// Frame building and response decoding
pub mod frame;

/// TCP transport with length-driven frame reads
pub mod transport;

/// Session lifecycle and the read-parameter pipeline
pub mod session;

/// Link configuration
pub mod config;

/// Logging hooks for exchange diagnostics
pub mod logging;

/// AQT560 register command table
pub mod registers;

// === Async runtime (users can use aqt_modbus::tokio) ===
pub use tokio;

// === Core session API ===
pub use session::{AqtSession, Exchange, ExchangeEvent};

// === Error handling ===
pub use error::{AqtError, AqtResult};

// === Framing ===
pub use checksum::{append_checksum, checksum, crc_bytes};
pub use frame::{
    build_frame, decode_frame, ChecksumPolicy, ChecksumVerdict, DecodedFrame, RegisterValue,
};

// === Transport ===
pub use transport::{format_hex_packet, TcpTransport, Transport, TransportStats};

// === Configuration ===
pub use config::LinkConfig;

// === Logging ===
pub use logging::{CallbackLogger, LogCallback, LogLevel};

// === Register map ===
pub use registers::{command_for, parameter_names, COMMANDS};

// === Commonly needed constants ===
pub use constants::{
    DEFAULT_HOST, DEFAULT_PORT, MAX_FRAME_SIZE, MIN_RESPONSE_LEN, RESPONSE_HEADER_LEN,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn info() -> String {
    format!("AQT Modbus v{} - AQT560 register client", VERSION)
}
