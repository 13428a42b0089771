//! Protocol constants for the AQT register read protocol
//!
//! The transmitter speaks Modbus RTU framing over a plain TCP socket
//! (a serial gateway on port 9001 by default). Response frames have the shape:
//!
//! ```text
//! [address][function][byte_count][payload (byte_count bytes)][crc_lo][crc_hi]
//! ```
//!
//! so the smallest well-formed response is 3 header bytes + 0 payload bytes
//! + 2 CRC bytes = 5 bytes.

// ============================================================================
// Frame Layout Constants
// ============================================================================

/// Response header length: address (1) + function (1) + byte count (1).
pub const RESPONSE_HEADER_LEN: usize = 3;

/// CRC trailer length (low byte, high byte).
pub const CRC_LEN: usize = 2;

/// Minimum length of a well-formed response frame.
pub const MIN_RESPONSE_LEN: usize = RESPONSE_HEADER_LEN + CRC_LEN;

/// Maximum RTU frame size (RS485 ADU limit, inherited by the gateway).
pub const MAX_FRAME_SIZE: usize = 256;

/// Length of a register read command in hex characters:
/// address (2) + function (2) + register address (4) + register count (4).
pub const COMMAND_HEX_LEN: usize = 12;

// ============================================================================
// Payload Byte Counts
// ============================================================================

/// Byte count declaring a 16-bit register value.
pub const BYTE_COUNT_U16: u8 = 2;

/// Byte count declaring a 32-bit register value (two registers).
pub const BYTE_COUNT_U32: u8 = 4;

/// Byte count declaring an 8-character ASCII identification string
/// (four registers).
pub const BYTE_COUNT_ASCII: u8 = 8;

// ============================================================================
// Communication Defaults
// ============================================================================

/// Default transmitter host (factory gateway address).
pub const DEFAULT_HOST: &str = "192.168.0.7";

/// Default transmitter TCP port.
pub const DEFAULT_PORT: u16 = 9001;

/// Default TCP connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;

/// Default response timeout in milliseconds.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 3000;

/// Default pause between sending a request and reading the reply, in
/// milliseconds. The serial gateway needs a moment to forward the response;
/// this is a courtesy delay only and never a substitute for the
/// length-driven read.
pub const DEFAULT_RESPONSE_DELAY_MS: u64 = 50;
