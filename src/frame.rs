//! SSI frame decoding
//!
//! A single SSI transaction bursts 24 bits out of the encoder:
//!
//! - byte 0: raw angle bits [13:6]
//! - byte 1: bits 7:2 = raw angle bits [5:0], bits 1:0 = status bits [3:2]
//! - byte 2: bits 7:6 = status bits [1:0], bits 5:0 = CRC6
//!
//! The reassembled status nibble carries the magnetic field strength in its
//! low two bits, the push-button event in bit 2 and the track-loss flag in
//! bit 3. The CRC6 field is not validated.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::FromByteArray;

/// Strength of the magnetic field seen by the sensor
///
/// Extracted from status bits 1:0 of the serial frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldStatus {
    /// Field within the working range
    Normal = 0x0,
    /// Magnet too close or too strong
    TooStrong = 0x1,
    /// Magnet too far or too weak
    TooWeak = 0x2,
    /// Both limit flags raised; reading is unreliable
    Error = 0x3,
}

impl From<u8> for FieldStatus {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0x0 => Self::Normal,
            0x1 => Self::TooStrong,
            0x2 => Self::TooWeak,
            _ => Self::Error,
        }
    }
}

bitflags! {
    /// Event flags reported in the serial frame
    ///
    /// Extracted from status bits 3:2 of the serial frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        /// Push-button event: the magnet moved towards the IC
        const BUTTON_PRESSED = 1 << 2;
        /// The sensor lost track of the rotation
        const TRACK_LOSS = 1 << 3;
    }
}

/// One decoded SSI burst read
///
/// Carries the 14-bit raw angle together with the status nibble. The angle
/// and status bits come from the same sample, unlike the two-register read
/// on the register bus.
#[derive(Debug, Clone, Copy)]
pub struct SsiFrame {
    /// Raw angle in [0, 16383], one full revolution
    pub raw_angle: u16,
    /// Magnetic field strength status
    pub field_status: FieldStatus,
    /// Push-button and track-loss flags
    pub flags: StatusFlags,
}

impl SsiFrame {
    /// The angle in degrees, in [0, 360).
    pub fn angle_degrees(&self) -> f32 {
        crate::degrees_from_raw(self.raw_angle)
    }

    /// Whether a push-button event was detected in this frame.
    pub fn button_pressed(&self) -> bool {
        self.flags.contains(StatusFlags::BUTTON_PRESSED)
    }

    /// Whether the sensor reported losing the rotation track in this frame.
    pub fn track_loss(&self) -> bool {
        self.flags.contains(StatusFlags::TRACK_LOSS)
    }
}

impl FromByteArray for SsiFrame {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let raw_angle = u16::from(bytes[0]) << 6 | u16::from(bytes[1] >> 2);
        let status = (bytes[1] & 0x03) << 2 | bytes[2] >> 6;

        Ok(Self {
            raw_angle,
            field_status: FieldStatus::from(status),
            flags: StatusFlags::from_bits_truncate(status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_angle_across_byte_boundary() {
        // Raw angle 10999 = 0b10_1010_1111_0111, clean status, junk CRC.
        let frame = SsiFrame::from_bytes([0xAB, 0b1101_1100, 0b0011_0101]).unwrap();

        assert_eq!(frame.raw_angle, 10999);
        assert_eq!(frame.field_status, FieldStatus::Normal);
        assert!(!frame.button_pressed());
        assert!(!frame.track_loss());
    }

    #[test]
    fn decodes_status_nibble() {
        // Track loss + button in byte 1, field-too-weak in byte 2.
        let frame = SsiFrame::from_bytes([0x00, 0b0000_0011, 0b1000_0000]).unwrap();

        assert_eq!(frame.raw_angle, 0);
        assert_eq!(frame.field_status, FieldStatus::TooWeak);
        assert!(frame.button_pressed());
        assert!(frame.track_loss());
    }

    #[test]
    fn full_scale_angle_is_14_bits() {
        let frame = SsiFrame::from_bytes([0xFF, 0xFC, 0x00]).unwrap();

        assert_eq!(frame.raw_angle, 16383);
        assert_eq!(frame.angle_degrees(), 16383.0 * (360.0 / 16384.0));
    }

    #[test]
    fn crc_bits_do_not_leak_into_status() {
        let frame = SsiFrame::from_bytes([0x00, 0x00, 0b0011_1111]).unwrap();

        assert_eq!(frame.field_status, FieldStatus::Normal);
        assert!(frame.flags.is_empty());
    }
}
