//! Output configuration registers
//!
//! This module contains registers that select what the encoder drives on its
//! output pins:
//! - Quadrature (ABZ) vs. commutation (UVW) multiplexing
//! - Rotation direction
//! - Analog vs. PWM pin mode, PWM carrier frequency and polarity
//! - Analog output start/stop angles

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Incremental output selection
///
/// Selects which signal group is multiplexed onto the A/B/Z pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputType {
    /// Quadrature A/B plus zero-index Z
    Abz,
    /// Motor commutation U/V/W
    Uvw,
}

/// Direction of rotation that increments the angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Angle increases for clockwise rotation (default)
    Clockwise,
    /// Angle increases for counter-clockwise rotation
    CounterClockwise,
}

/// PWM carrier frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmFrequency {
    /// 994.4 Hz (default)
    Hz994_4,
    /// 497.2 Hz
    Hz497_2,
}

/// PWM output polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmPolarity {
    /// Duty cycle is high-active (default)
    ActiveHigh,
    /// Duty cycle is low-active
    ActiveLow,
}

/// OUT pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Ratiometric analog voltage output (default)
    Analog,
    /// PWM output
    Pwm,
}

/// UVW mux register (address: 0x25)
///
/// Enables the complementary -A-B-Z outputs in UVW mode.
///
/// # Important Notes
/// - Only effective on the QFN package
/// - Remaining bits of the byte are undocumented and preserved on write
#[register(0x25u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct UvwMux {
    /// Drive -A-B-Z instead of U/V/W (bit 7)
    pub nanbnz_enabled: bool,
    reserved: u8,
}

/// Output mux register (address: 0x29)
///
/// Selects the incremental output group and the counting direction.
///
/// # Important Notes
/// - Bits other than 6 and 1 are undocumented and preserved on write
#[register(0x29u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct OutputMux {
    /// ABZ/UVW multiplexer (bit 6)
    pub output_type: OutputType,
    /// Counting direction (bit 1)
    pub direction: Direction,
    reserved: u8,
}

/// Output control register (address: 0x38)
///
/// Configures the OUT pin: analog or PWM mode, and the PWM carrier
/// frequency and polarity.
///
/// # Important Notes
/// - Bits 4:0 are undocumented and preserved on write
#[register(0x38u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct OutputControl {
    /// PWM carrier frequency (bit 7)
    pub pwm_frequency: PwmFrequency,
    /// PWM polarity (bit 6)
    pub pwm_polarity: PwmPolarity,
    /// OUT pin mode (bit 5)
    pub pin_mode: PinMode,
    reserved: u8,
}

/// Analog range high register (address: 0x3E)
///
/// Holds the upper nibbles of the 12-bit analog start and stop angles.
/// The whole byte belongs to these two fields, so it can be written
/// directly without a prior read.
#[register(0x3Eu8)]
#[derive(Debug, Clone, Copy, Default, ReadableRegister, WritableRegister)]
pub struct AnalogRangeHigh {
    /// Analog stop angle bits [11:8] (bits 7:4)
    pub stop_high: u8,
    /// Analog start angle bits [11:8] (bits 3:0)
    pub start_high: u8,
}

/// Analog start low register (address: 0x3F)
///
/// Bits [7:0] of the 12-bit analog start angle.
#[register(0x3Fu8)]
#[derive(Debug, Clone, Copy, Default, ReadableRegister, WritableRegister)]
pub struct AnalogStartLow {
    /// Analog start angle bits [7:0]
    pub value: u8,
}

/// Analog stop low register (address: 0x40)
///
/// Bits [7:0] of the 12-bit analog stop angle.
#[register(0x40u8)]
#[derive(Debug, Clone, Copy, Default, ReadableRegister, WritableRegister)]
pub struct AnalogStopLow {
    /// Analog stop angle bits [7:0]
    pub value: u8,
}

impl FromByteArray for UvwMux {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            nanbnz_enabled: bytes[0] & 0x80 != 0,
            reserved: bytes[0] & 0x7F,
        })
    }
}

impl ToByteArray for UvwMux {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.nanbnz_enabled as u8) << 7 | self.reserved])
    }
}

impl FromByteArray for OutputMux {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            output_type: if bytes[0] & 0x40 != 0 {
                OutputType::Uvw
            } else {
                OutputType::Abz
            },
            direction: if bytes[0] & 0x02 != 0 {
                Direction::CounterClockwise
            } else {
                Direction::Clockwise
            },
            reserved: bytes[0] & !0x42,
        })
    }
}

impl ToByteArray for OutputMux {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut byte = self.reserved;
        if let OutputType::Uvw = self.output_type {
            byte |= 0x40;
        }
        if let Direction::CounterClockwise = self.direction {
            byte |= 0x02;
        }
        Ok([byte])
    }
}

impl FromByteArray for OutputControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            pwm_frequency: if bytes[0] & 0x80 != 0 {
                PwmFrequency::Hz497_2
            } else {
                PwmFrequency::Hz994_4
            },
            pwm_polarity: if bytes[0] & 0x40 != 0 {
                PwmPolarity::ActiveLow
            } else {
                PwmPolarity::ActiveHigh
            },
            pin_mode: if bytes[0] & 0x20 != 0 {
                PinMode::Pwm
            } else {
                PinMode::Analog
            },
            reserved: bytes[0] & 0x1F,
        })
    }
}

impl ToByteArray for OutputControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut byte = self.reserved;
        if let PwmFrequency::Hz497_2 = self.pwm_frequency {
            byte |= 0x80;
        }
        if let PwmPolarity::ActiveLow = self.pwm_polarity {
            byte |= 0x40;
        }
        if let PinMode::Pwm = self.pin_mode {
            byte |= 0x20;
        }
        Ok([byte])
    }
}

impl FromByteArray for AnalogRangeHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            stop_high: bytes[0] >> 4,
            start_high: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for AnalogRangeHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.stop_high & 0x0F) << 4 | (self.start_high & 0x0F)])
    }
}

impl FromByteArray for AnalogStartLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for AnalogStartLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for AnalogStopLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for AnalogStopLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}
