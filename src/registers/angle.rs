//! Angle readout registers
//!
//! The 14-bit raw angle is split across two read-only registers on the
//! register bus. Both halves are sampled independently, so a fast-moving
//! shaft can tear between the two reads; the serial frame does not have
//! this limitation.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister};

/// Angle high register (address: 0x03)
///
/// Holds bits [13:6] of the raw angle.
#[register(0x03u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct AngleHigh {
    /// Raw angle bits [13:6]
    pub value: u8,
}

/// Angle low register (address: 0x04)
///
/// Holds bits [5:0] of the raw angle in the upper six bits of the byte.
/// The decoded `value` is already shifted down to [5:0].
#[register(0x04u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct AngleLow {
    /// Raw angle bits [5:0]
    pub value: u8,
}

/// Combines the two angle registers into the 14-bit raw angle [0, 16383].
pub fn raw_angle(high: AngleHigh, low: AngleLow) -> u16 {
    u16::from(high.value) << 6 | u16::from(low.value)
}

impl FromByteArray for AngleHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl FromByteArray for AngleLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: bytes[0] >> 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_halves_combine_into_14_bits() {
        let high = AngleHigh::from_bytes([0xAB]).unwrap();
        let low = AngleLow::from_bytes([0b1101_1101]).unwrap();

        assert_eq!(low.value, 0b11_0111);
        assert_eq!(raw_angle(high, low), (0xAB << 6) | 0b11_0111);
    }

    #[test]
    fn full_scale_angle() {
        let high = AngleHigh::from_bytes([0xFF]).unwrap();
        let low = AngleLow::from_bytes([0xFC]).unwrap();

        assert_eq!(raw_angle(high, low), 16383);
    }
}
