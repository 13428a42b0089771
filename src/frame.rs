//! Frame construction and response decoding
//!
//! A request frame is the caller's hex-encoded command converted to raw bytes
//! with the CRC appended. A response frame is self-describing through its
//! third byte (`byte_count`):
//!
//! | byte_count | Interpretation |
//! |------------|----------------|
//! | 2 | big-endian unsigned 16-bit register value |
//! | 4 | big-endian unsigned 32-bit value (two registers) |
//! | 8 | 8-character ASCII identification string, NUL/space/CR/LF trimmed |
//! | other | raw payload bytes, reported as-is |
//!
//! Numeric payloads are big-endian (the register's native order). This is
//! independent of the CRC trailer, which travels low byte first — the two
//! conventions must not be conflated.

use std::fmt;

use tracing::{debug, warn};

use crate::checksum::{checksum, crc_bytes};
use crate::constants::{
    BYTE_COUNT_ASCII, BYTE_COUNT_U16, BYTE_COUNT_U32, CRC_LEN, MIN_RESPONSE_LEN,
    RESPONSE_HEADER_LEN,
};
use crate::error::{AqtError, AqtResult};

/// A decoded register value.
///
/// Exactly one variant is produced per successful decode. Failures are
/// reported through [`AqtError`] rather than a sentinel variant, so callers
/// pattern-match on `Result` instead of probing for absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterValue {
    /// 16-bit unsigned register value.
    U16(u16),
    /// 32-bit unsigned value spanning two registers.
    U32(u32),
    /// Fixed-length ASCII identification string, trimmed.
    Ascii(String),
    /// Raw payload bytes for an undocumented byte count.
    Raw(Vec<u8>),
}

impl RegisterValue {
    /// Returns the variant name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            RegisterValue::U16(_) => "u16",
            RegisterValue::U32(_) => "u32",
            RegisterValue::Ascii(_) => "ascii",
            RegisterValue::Raw(_) => "raw",
        }
    }

    /// Numeric view of the value, when it has one.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            RegisterValue::U16(v) => Some(u32::from(*v)),
            RegisterValue::U32(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterValue::U16(v) => write!(f, "{}", v),
            RegisterValue::U32(v) => write!(f, "{}", v),
            RegisterValue::Ascii(s) => write!(f, "'{}'", s),
            RegisterValue::Raw(bytes) => {
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome of the response CRC comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumVerdict {
    /// Trailer matched the computed CRC.
    Ok,
    /// Trailer did not match. Carries both values for diagnostics.
    Mismatch { received: u16, calculated: u16 },
}

impl ChecksumVerdict {
    /// Whether the CRC check passed.
    pub fn is_ok(&self) -> bool {
        matches!(self, ChecksumVerdict::Ok)
    }
}

impl fmt::Display for ChecksumVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumVerdict::Ok => write!(f, "OK"),
            ChecksumVerdict::Mismatch {
                received,
                calculated,
            } => write!(f, "BAD (recv={:04X}, calc={:04X})", received, calculated),
        }
    }
}

/// How to treat a CRC mismatch in a response frame.
///
/// Field tooling for these transmitters logs the mismatch but still uses
/// the parsed value, so [`Lenient`](ChecksumPolicy::Lenient) is the default.
/// Consumers that need a hard integrity guarantee should switch to
/// [`Strict`](ChecksumPolicy::Strict), which fails the read instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Report the mismatch as an advisory verdict and decode anyway.
    #[default]
    Lenient,
    /// Treat the mismatch as fatal to the read.
    Strict,
}

/// A fully decoded response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// The interpreted payload.
    pub value: RegisterValue,
    /// CRC comparison result. Under the lenient policy a `Mismatch` verdict
    /// accompanies a still-decoded value.
    pub checksum: ChecksumVerdict,
    /// Payload length declared by the frame header.
    pub byte_count: u8,
}

// ============================================================================
// Frame Builder
// ============================================================================

/// Build a transmit frame from a hex-encoded command.
///
/// Converts `command_hex` to raw bytes and appends the CRC trailer. The
/// output is always `command_hex.len() / 2 + 2` bytes. Fails with
/// [`AqtError::MalformedCommand`] on odd length or non-hex characters.
///
/// # Example
///
/// ```rust
/// use aqt_modbus::build_frame;
///
/// let frame = build_frame("010300980002").unwrap();
/// assert_eq!(frame.len(), 8);
/// assert_eq!(&frame[..6], &[0x01, 0x03, 0x00, 0x98, 0x00, 0x02]);
/// ```
pub fn build_frame(command_hex: &str) -> AqtResult<Vec<u8>> {
    let mut frame = decode_hex(command_hex)?;
    crate::checksum::append_checksum(&mut frame);
    debug!(
        "Frame built: {} command bytes + CRC, total {}",
        frame.len() - CRC_LEN,
        frame.len()
    );
    Ok(frame)
}

/// Decode a hex command string to raw bytes.
pub(crate) fn decode_hex(command_hex: &str) -> AqtResult<Vec<u8>> {
    let hex = command_hex.trim();
    if hex.is_empty() {
        return Err(AqtError::malformed_command("empty command"));
    }
    if hex.len() % 2 != 0 {
        return Err(AqtError::malformed_command(format!(
            "odd hex length: {}",
            hex.len()
        )));
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        let hi = hex_nibble(chunk[0])?;
        let lo = hex_nibble(chunk[1])?;
        bytes.push((hi << 4) | lo);
    }
    Ok(bytes)
}

/// Convert a single ASCII hex character to its value.
fn hex_nibble(c: u8) -> AqtResult<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        _ => Err(AqtError::malformed_command(format!(
            "invalid hex character: {:?}",
            c as char
        ))),
    }
}

// ============================================================================
// Frame Decoder
// ============================================================================

/// Decode a response frame into a typed register value.
///
/// Validates the frame length against the declared byte count, verifies the
/// CRC trailer, and dispatches on the byte count. See the module docs for
/// the interpretation table.
///
/// # Errors
///
/// * [`AqtError::ShortFrame`] if fewer than 5 bytes arrived, or fewer than
///   `3 + byte_count + 2`.
/// * [`AqtError::ChecksumMismatch`] on a CRC mismatch, but only under
///   [`ChecksumPolicy::Strict`].
pub fn decode_frame(frame: &[u8], policy: ChecksumPolicy) -> AqtResult<DecodedFrame> {
    if frame.len() < MIN_RESPONSE_LEN {
        return Err(AqtError::ShortFrame {
            expected: MIN_RESPONSE_LEN,
            actual: frame.len(),
        });
    }

    let byte_count = frame[2];
    let expected_len = RESPONSE_HEADER_LEN + byte_count as usize + CRC_LEN;
    if frame.len() < expected_len {
        return Err(AqtError::ShortFrame {
            expected: expected_len,
            actual: frame.len(),
        });
    }

    let body = &frame[..frame.len() - CRC_LEN];
    let calculated = checksum(body);
    let (calc_lo, calc_hi) = crc_bytes(calculated);
    let recv_lo = frame[frame.len() - 2];
    let recv_hi = frame[frame.len() - 1];

    let verdict = if recv_lo == calc_lo && recv_hi == calc_hi {
        ChecksumVerdict::Ok
    } else {
        let received = u16::from(recv_hi) << 8 | u16::from(recv_lo);
        warn!(
            "Response CRC mismatch: received 0x{:04X}, calculated 0x{:04X}",
            received, calculated
        );
        if policy == ChecksumPolicy::Strict {
            return Err(AqtError::ChecksumMismatch {
                received,
                calculated,
            });
        }
        ChecksumVerdict::Mismatch {
            received,
            calculated,
        }
    };

    let payload = &frame[RESPONSE_HEADER_LEN..RESPONSE_HEADER_LEN + byte_count as usize];
    let value = decode_payload(byte_count, payload);
    debug!(
        "Decoded {} value from byte_count={}: {}",
        value.type_name(),
        byte_count,
        value
    );

    Ok(DecodedFrame {
        value,
        checksum: verdict,
        byte_count,
    })
}

/// Interpret the payload according to the declared byte count.
fn decode_payload(byte_count: u8, payload: &[u8]) -> RegisterValue {
    match byte_count {
        BYTE_COUNT_U16 => RegisterValue::U16(u16::from_be_bytes([payload[0], payload[1]])),
        BYTE_COUNT_U32 => RegisterValue::U32(u32::from_be_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ])),
        BYTE_COUNT_ASCII => {
            // Undecodable bytes are dropped, then framing padding trimmed.
            let text: String = payload
                .iter()
                .filter(|b| b.is_ascii())
                .map(|&b| b as char)
                .collect();
            RegisterValue::Ascii(
                text.trim_matches(|c| matches!(c, '\0' | ' ' | '\r' | '\n'))
                    .to_string(),
            )
        }
        other => {
            warn!(
                "Unexpected byte count {} ({} payload bytes), returning raw",
                other,
                payload.len()
            );
            RegisterValue::Raw(payload.to_vec())
        }
    }
}
