#![no_std]
//! MT6701 Rotary Encoder Driver
//!
//! This crate provides a type-safe interface for the MagnTek MT6701 magnetic
//! rotary position sensor. The MT6701 is a Hall-based absolute angle encoder
//! that resolves one mechanical revolution into 14 bits and can drive
//! quadrature (ABZ), motor commutation (UVW), analog or PWM outputs.
//!
//! # Features
//! - 14-bit absolute angle readout (raw counts or degrees)
//! - Two transports:
//!   - Register bus (I2C): angle readout and full configuration
//!   - Serial bus (SSI over SPI): angle readout plus field status,
//!     push-button and track-loss flags
//! - Register-level configuration:
//!   - ABZ/UVW output selection, pole pairs, pulses per revolution
//!   - Zero offset, rotation direction, hysteresis, Z pulse width
//!   - Analog output range, PWM frequency and polarity
//! - EEPROM programming to persist configuration across power cycles
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Transport handles for hardware interaction
//!   - [`Mt6701I2c`] for the register bus (configuration + readout)
//!   - [`Mt6701Ssi`] for the serial bus (readout + status)
//!
//! - [`registers`]: Register definitions for direct hardware access
//!   - Angle, output, tracking and EEPROM programming registers
//!   - Fields that straddle byte boundaries are reassembled by the
//!     device methods
//!
//! - [`frame`]: SSI frame decoding
//!   - 14-bit angle and status nibble packed across three bytes
//!
//! # Usage
//! The driver uses the `regiface` crate to provide a type-safe interface
//! for register access. Configuration is only possible over the register
//! bus; the serial bus is read-only but is the only transport that carries
//! the status bits.
//!
//! # Important Notes
//! - Raw angles are unsigned fixed-point: [0, 16383] maps to [0, 360)
//!   degrees with no two's complement anywhere
//! - Configuration registers pack unrelated fields into shared bytes;
//!   setters read-modify-write so neighbouring bits are preserved
//! - EEPROM programming requires a 4.5-5.5 V supply and a 600 ms settle
//! - The CRC6 field of the serial frame is not validated
//!
//! # Example
//! ```no_run
//! use embedded_hal::i2c::I2c;
//! use mt6701::{Error, Mt6701I2c};
//!
//! fn read_position<I2C: I2c>(i2c: I2C) -> Result<f32, Error> {
//!     let mut encoder = Mt6701I2c::new(i2c);
//!     encoder.angle_degrees()
//! }
//! ```

pub mod device;
pub mod frame;
pub mod registers;

pub use device::*;
pub use frame::*;
pub use registers::*;

/// Errors returned by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Communication on the underlying bus failed
    Bus,
    /// A register or frame held a value that could not be decoded
    Deserialization,
    /// A parameter was outside the range accepted by the device
    OutOfRange,
}

/// One revolution is 2^14 raw counts.
pub(crate) fn degrees_from_raw(raw: u16) -> f32 {
    f32::from(raw) * (360.0 / 16384.0)
}

/// 12-bit fields (zero offset, analog range) use 2^12 counts per revolution.
pub(crate) fn raw12_from_degrees(degrees: f32) -> u16 {
    (degrees * (4096.0 / 360.0)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_conversions() {
        assert_eq!(degrees_from_raw(0), 0.0);
        assert_eq!(degrees_from_raw(8192), 180.0);
        assert_eq!(raw12_from_degrees(0.0), 0);
        assert_eq!(raw12_from_degrees(180.0), 2048);
        assert_eq!(raw12_from_degrees(359.999), 4095);
    }
}
