//! Tracking configuration registers
//!
//! This module contains registers that shape how the measured angle is
//! tracked and reported:
//! - UVW pole-pair count and ABZ pulses-per-revolution resolution
//! - Zero offset (12-bit)
//! - Output hysteresis (3-bit code split across two registers)
//! - Z pulse width in ABZ mode
//!
//! The hardware stores both multi-bit values minus one and splits them, and
//! the zero offset, across byte boundaries; the device interface reassembles
//! them from the whole-byte registers defined here.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Error type for reserved Z pulse width codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidPulseWidth(pub u8);

/// Width of the Z index pulse in ABZ mode
///
/// Widths are expressed in output LSBs, except for [`PulseWidth::Half`]
/// which keeps Z asserted for half a revolution. Code 0x7 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseWidth {
    /// 1 LSB (default)
    OneLsb = 0x0,
    /// 2 LSB
    TwoLsb = 0x1,
    /// 4 LSB
    FourLsb = 0x2,
    /// 8 LSB
    EightLsb = 0x3,
    /// 12 LSB
    TwelveLsb = 0x4,
    /// 16 LSB
    SixteenLsb = 0x5,
    /// 180 degrees of rotation
    Half = 0x6,
}

impl TryFrom<u8> for PulseWidth {
    type Error = InvalidPulseWidth;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(Self::OneLsb),
            0x1 => Ok(Self::TwoLsb),
            0x2 => Ok(Self::FourLsb),
            0x3 => Ok(Self::EightLsb),
            0x4 => Ok(Self::TwelveLsb),
            0x5 => Ok(Self::SixteenLsb),
            0x6 => Ok(Self::Half),
            invalid => Err(InvalidPulseWidth(invalid)),
        }
    }
}

/// Output hysteresis in angle LSBs
///
/// The 3-bit code is split across two registers: bits [1:0] live in
/// [`HysteresisLow`] and bit [2] in [`ZeroHigh`]. Codes 0x4 and 0x7 are
/// reserved by the datasheet and not representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hysteresis {
    /// 1 LSB
    OneLsb = 0x0,
    /// 2 LSB
    TwoLsb = 0x1,
    /// 4 LSB
    FourLsb = 0x2,
    /// 8 LSB
    EightLsb = 0x3,
    /// 0.25 LSB
    QuarterLsb = 0x5,
    /// 0.5 LSB
    HalfLsb = 0x6,
}

impl Hysteresis {
    /// Bits [1:0] of the hysteresis code, stored in [`HysteresisLow`].
    pub fn low_bits(self) -> u8 {
        self as u8 & 0x03
    }

    /// Bit [2] of the hysteresis code, stored in [`ZeroHigh`].
    pub fn msb(self) -> bool {
        self as u8 & 0x04 != 0
    }
}

/// Resolution register (address: 0x30)
///
/// Packs the UVW pole-pair count and the top bits of the ABZ resolution.
/// Both fields are stored minus one.
///
/// # Important Notes
/// - Bits 3:2 are undocumented and preserved on write
#[register(0x30u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Resolution {
    /// UVW pole pairs - 1 (bits 7:4)
    pub uvw_resolution: u8,
    /// ABZ pulses-per-revolution - 1, bits [9:8] (bits 1:0)
    pub abz_resolution_high: u8,
    reserved: u8,
}

/// ABZ resolution low register (address: 0x31)
///
/// Bits [7:0] of the ABZ pulses-per-revolution value, stored minus one.
#[register(0x31u8)]
#[derive(Debug, Clone, Copy, Default, ReadableRegister, WritableRegister)]
pub struct AbzResolutionLow {
    /// ABZ pulses-per-revolution - 1, bits [7:0]
    pub value: u8,
}

/// Zero high register (address: 0x32)
///
/// Shared by three fields: the hysteresis code MSB, the Z pulse width and
/// the upper nibble of the 12-bit zero offset.
#[register(0x32u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct ZeroHigh {
    /// Hysteresis code bit [2] (bit 7)
    pub hysteresis_msb: bool,
    /// Z pulse width (bits 6:4)
    pub pulse_width: PulseWidth,
    /// Zero offset bits [11:8] (bits 3:0)
    pub zero_high: u8,
}

/// Zero low register (address: 0x33)
///
/// Bits [7:0] of the 12-bit zero offset.
#[register(0x33u8)]
#[derive(Debug, Clone, Copy, Default, ReadableRegister, WritableRegister)]
pub struct ZeroLow {
    /// Zero offset bits [7:0]
    pub value: u8,
}

/// Hysteresis low register (address: 0x34)
///
/// Holds bits [1:0] of the hysteresis code in the top two bits of the byte.
///
/// # Important Notes
/// - Bits 5:0 are undocumented and preserved on write
#[register(0x34u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct HysteresisLow {
    /// Hysteresis code bits [1:0] (bits 7:6)
    pub hysteresis_low: u8,
    reserved: u8,
}

impl FromByteArray for Resolution {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            uvw_resolution: bytes[0] >> 4,
            abz_resolution_high: bytes[0] & 0x03,
            reserved: bytes[0] & 0x0C,
        })
    }
}

impl ToByteArray for Resolution {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.uvw_resolution & 0x0F) << 4 | self.reserved | (self.abz_resolution_high & 0x03)])
    }
}

impl FromByteArray for AbzResolutionLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for AbzResolutionLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for ZeroLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for ZeroLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for ZeroHigh {
    type Error = InvalidPulseWidth;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            hysteresis_msb: bytes[0] & 0x80 != 0,
            pulse_width: PulseWidth::try_from((bytes[0] >> 4) & 0x07)?,
            zero_high: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for ZeroHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.hysteresis_msb as u8) << 7
            | (self.pulse_width as u8) << 4
            | (self.zero_high & 0x0F)])
    }
}

impl FromByteArray for HysteresisLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            hysteresis_low: bytes[0] >> 6,
            reserved: bytes[0] & 0x3F,
        })
    }
}

impl ToByteArray for HysteresisLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.hysteresis_low & 0x03) << 6 | self.reserved])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_preserves_reserved_bits() {
        let mut resolution = Resolution::from_bytes([0b0000_1100]).unwrap();
        assert_eq!(resolution.uvw_resolution, 0);
        assert_eq!(resolution.abz_resolution_high, 0);

        resolution.uvw_resolution = 0xF;
        resolution.abz_resolution_high = 0x3;
        assert_eq!(resolution.to_bytes().unwrap(), [0xFF]);
    }

    #[test]
    fn zero_low_is_a_plain_byte() {
        let zero = ZeroLow::from_bytes([0xBC]).unwrap();
        assert_eq!(zero.value, 0xBC);
        assert_eq!(zero.to_bytes().unwrap(), [0xBC]);
    }

    #[test]
    fn zero_high_packs_three_fields() {
        let zero = ZeroHigh::from_bytes([0b1010_1100]).unwrap();
        assert!(zero.hysteresis_msb);
        assert_eq!(zero.pulse_width, PulseWidth::FourLsb);
        assert_eq!(zero.zero_high, 0x0C);
        assert_eq!(zero.to_bytes().unwrap(), [0b1010_1100]);
    }

    #[test]
    fn zero_high_rejects_reserved_pulse_width() {
        assert!(matches!(
            ZeroHigh::from_bytes([0b0111_0000]),
            Err(InvalidPulseWidth(0x7))
        ));
    }

    #[test]
    fn hysteresis_code_splits() {
        assert_eq!(Hysteresis::QuarterLsb.low_bits(), 0x1);
        assert!(Hysteresis::QuarterLsb.msb());
        assert_eq!(Hysteresis::EightLsb.low_bits(), 0x3);
        assert!(!Hysteresis::EightLsb.msb());
    }

    #[test]
    fn hysteresis_low_keeps_neighbours() {
        let mut hysteresis = HysteresisLow::from_bytes([0b0011_1010]).unwrap();
        assert_eq!(hysteresis.hysteresis_low, 0);

        hysteresis.hysteresis_low = Hysteresis::HalfLsb.low_bits();
        assert_eq!(hysteresis.to_bytes().unwrap(), [0b1011_1010]);
    }
}
