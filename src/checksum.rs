//! CRC-16/MODBUS checksum for request and response frames
//!
//! The transmitter protects every frame with the standard Modbus CRC
//! (reflected polynomial 0xA001, initial register 0xFFFF, no final XOR).
//! The two CRC bytes travel low byte first, exactly as the raw 16-bit value
//! splits: `lo = crc & 0xFF`, `hi = (crc >> 8) & 0xFF`. Some Modbus variants
//! swap these on the wire; this device does not.

use crc::{Crc, CRC_16_MODBUS};

/// CRC calculator shared by the frame builder and decoder.
const CRC_MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Compute the CRC-16/MODBUS checksum over `data`.
///
/// Pure and deterministic: identical input always yields the same value.
#[inline]
pub fn checksum(data: &[u8]) -> u16 {
    CRC_MODBUS.checksum(data)
}

/// Append the two checksum bytes to `frame`, low byte first.
pub fn append_checksum(frame: &mut Vec<u8>) {
    let crc = checksum(frame);
    frame.push((crc & 0xFF) as u8);
    frame.push((crc >> 8) as u8);
}

/// Split a CRC value into its on-wire (low, high) byte pair.
#[inline]
pub fn crc_bytes(crc: u16) -> (u8, u8) {
    ((crc & 0xFF) as u8, (crc >> 8) as u8)
}
