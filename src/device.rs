//! MT6701 device interfaces
//!
//! This module provides the two transport handles for the encoder:
//!
//! - [`Mt6701I2c`] wraps an I2C bus and exposes the full configuration
//!   surface plus angle readout. Generic register access goes through
//!   [`read_register`](Mt6701I2c::read_register),
//!   [`write_register`](Mt6701I2c::write_register) and
//!   [`modify_register`](Mt6701I2c::modify_register); the higher-level
//!   methods translate degrees, pole pairs and pulse counts into the
//!   register fields for you.
//!
//! - [`Mt6701Ssi`] wraps an SPI device configured for the SSI interface
//!   and exposes angle plus status readout. The SSI frame is the only way
//!   to observe the field status, push-button and track-loss bits.
//!
//! Both handles support synchronous operation through the embedded-hal
//! traits and asynchronous operation through embedded-hal-async.
//!
//! # Example
//! ```no_run
//! use embedded_hal::i2c::I2c;
//! use mt6701::{Direction, Error, Hysteresis, Mt6701I2c, PulseWidth};
//!
//! fn configure_encoder<I2C: I2c>(i2c: I2C) -> Result<Mt6701I2c<I2C>, Error> {
//!     let mut encoder = Mt6701I2c::new(i2c);
//!
//!     encoder.set_rotation_direction(Direction::Clockwise)?;
//!     encoder.configure_abz(1024, PulseWidth::OneLsb, Hysteresis::OneLsb)?;
//!
//!     Ok(encoder)
//! }
//! ```

use core::convert::Infallible;

use regiface::{ByteArray, FromByteArray, ReadableRegister, WritableRegister};

use crate::frame::{FieldStatus, SsiFrame};
use crate::registers::{
    raw_angle, AbzResolutionLow, AnalogRangeHigh, AnalogStartLow, AnalogStopLow, AngleHigh,
    AngleLow, Direction, Hysteresis, HysteresisLow, OutputControl, OutputMux, OutputType, PinMode,
    ProgrammingCommand, ProgrammingKey, PulseWidth, PwmFrequency, PwmPolarity, Resolution, UvwMux,
    ZeroHigh, ZeroLow,
};
use crate::{degrees_from_raw, raw12_from_degrees, Error};

/// Default 7-bit address of the encoder on the register bus.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x06;

/// SPI mode required by the SSI interface.
pub const SSI_MODE: embedded_hal::spi::Mode = embedded_hal::spi::MODE_2;

/// Milliseconds the encoder needs to commit its configuration to EEPROM.
const EEPROM_COMMIT_MS: u32 = 600;

/// Register-bus handle for the MT6701.
///
/// Wraps an I2C bus and provides configuration and angle readout. All
/// partial-byte fields are changed by read-modify-write, so undocumented
/// sibling bits survive every setter.
pub struct Mt6701I2c<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Mt6701I2c<I2C> {
    /// Creates a handle using the default device address.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_I2C_ADDRESS)
    }

    /// Creates a handle for a device strapped to a non-default address.
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Releases the underlying I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Mt6701I2c<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Reads a register value from the device.
    ///
    /// # Errors
    /// * `Error::Bus` - I2C communication failed
    /// * `Error::Deserialization` - register held an undecodable value
    pub fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();

        self.i2c
            .write_read(self.address, &[R::id()], raw_value.as_mut())
            .map_err(|_| Error::Bus)?;

        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Writes a value to a device register.
    ///
    /// # Errors
    /// * `Error::Bus` - I2C communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
    {
        let [value] = register.to_bytes().unwrap();

        self.i2c
            .write(self.address, &[R::id(), value])
            .map_err(|_| Error::Bus)
    }

    /// Reads a register, applies `f` to it and writes it back.
    ///
    /// This is the primitive behind every single-field setter: the MT6701
    /// packs unrelated fields into shared EEPROM bytes, so sibling bits
    /// must be carried through each write.
    pub fn modify_register<R, F>(&mut self, f: F) -> Result<(), Error>
    where
        R: ReadableRegister<IdType = u8>
            + WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
        F: FnOnce(&mut R),
    {
        let mut register = self.read_register::<R>()?;
        f(&mut register);
        self.write_register(register)
    }

    /// Reads the raw angle, in [0, 16383] over one revolution.
    ///
    /// The two halves are read in separate bus transactions, high byte
    /// first, matching the register layout.
    pub fn raw_angle(&mut self) -> Result<u16, Error> {
        let high = self.read_register::<AngleHigh>()?;
        let low = self.read_register::<AngleLow>()?;
        Ok(raw_angle(high, low))
    }

    /// Reads the angle in degrees, in [0, 360).
    pub fn angle_degrees(&mut self) -> Result<f32, Error> {
        self.raw_angle().map(degrees_from_raw)
    }

    /// Selects ABZ or UVW output on the incremental pins.
    pub fn set_output_type(&mut self, output_type: OutputType) -> Result<(), Error> {
        self.modify_register::<OutputMux, _>(|reg| reg.output_type = output_type)
    }

    /// Sets which rotation direction increments the angle.
    pub fn set_rotation_direction(&mut self, direction: Direction) -> Result<(), Error> {
        self.modify_register::<OutputMux, _>(|reg| reg.direction = direction)
    }

    /// Enables the complementary -A-B-Z outputs (QFN package only).
    pub fn set_nanbnz_enabled(&mut self, enabled: bool) -> Result<(), Error> {
        self.modify_register::<UvwMux, _>(|reg| reg.nanbnz_enabled = enabled)
    }

    /// Sets the UVW pole-pair count, valid range 1..=16.
    pub fn set_pole_pairs(&mut self, pole_pairs: u8) -> Result<(), Error> {
        if !(1..=16).contains(&pole_pairs) {
            return Err(Error::OutOfRange);
        }

        self.modify_register::<Resolution, _>(|reg| reg.uvw_resolution = pole_pairs - 1)
    }

    /// Sets the ABZ resolution in pulses per revolution, valid range 1..=1024.
    pub fn set_pulses_per_revolution(&mut self, pulses: u16) -> Result<(), Error> {
        if !(1..=1024).contains(&pulses) {
            return Err(Error::OutOfRange);
        }

        let value = pulses - 1;
        self.write_register(AbzResolutionLow { value: value as u8 })?;
        self.modify_register::<Resolution, _>(|reg| {
            reg.abz_resolution_high = (value >> 8) as u8
        })
    }

    /// Sets the zero offset as a raw 12-bit value.
    ///
    /// The value is masked to 12 bits before writing.
    pub fn set_zero_raw(&mut self, zero: u16) -> Result<(), Error> {
        let zero = zero & 0x0FFF;

        self.write_register(ZeroLow { value: zero as u8 })?;
        self.modify_register::<ZeroHigh, _>(|reg| reg.zero_high = (zero >> 8) as u8)
    }

    /// Sets the zero offset in degrees, [0, 360).
    pub fn set_zero_degrees(&mut self, degrees: f32) -> Result<(), Error> {
        self.set_zero_raw(raw12_from_degrees(degrees))
    }

    /// Sets the output hysteresis.
    pub fn set_hysteresis(&mut self, hysteresis: Hysteresis) -> Result<(), Error> {
        self.modify_register::<HysteresisLow, _>(|reg| {
            reg.hysteresis_low = hysteresis.low_bits()
        })?;
        self.modify_register::<ZeroHigh, _>(|reg| reg.hysteresis_msb = hysteresis.msb())
    }

    /// Sets the Z index pulse width used in ABZ mode.
    pub fn set_pulse_width(&mut self, pulse_width: PulseWidth) -> Result<(), Error> {
        self.modify_register::<ZeroHigh, _>(|reg| reg.pulse_width = pulse_width)
    }

    /// Sets the PWM carrier frequency.
    pub fn set_pwm_frequency(&mut self, frequency: PwmFrequency) -> Result<(), Error> {
        self.modify_register::<OutputControl, _>(|reg| reg.pwm_frequency = frequency)
    }

    /// Sets the PWM output polarity.
    pub fn set_pwm_polarity(&mut self, polarity: PwmPolarity) -> Result<(), Error> {
        self.modify_register::<OutputControl, _>(|reg| reg.pwm_polarity = polarity)
    }

    /// Selects analog or PWM output on the OUT pin.
    pub fn set_pin_mode(&mut self, mode: PinMode) -> Result<(), Error> {
        self.modify_register::<OutputControl, _>(|reg| reg.pin_mode = mode)
    }

    /// Sets the analog output range as raw 12-bit angles.
    ///
    /// # Errors
    /// * `Error::OutOfRange` - either bound is 4096 or larger
    pub fn set_analog_range_raw(&mut self, start: u16, stop: u16) -> Result<(), Error> {
        if start >= 4096 || stop >= 4096 {
            return Err(Error::OutOfRange);
        }

        self.write_register(AnalogStartLow { value: start as u8 })?;
        self.write_register(AnalogStopLow { value: stop as u8 })?;
        self.write_register(AnalogRangeHigh {
            start_high: (start >> 8) as u8,
            stop_high: (stop >> 8) as u8,
        })
    }

    /// Sets the analog output range in degrees.
    ///
    /// Out-of-range inputs are clamped: the start angle to 0, the stop
    /// angle to the 4095 maximum.
    pub fn set_analog_range_degrees(&mut self, start: f32, stop: f32) -> Result<(), Error> {
        let mut start = raw12_from_degrees(start);
        let mut stop = raw12_from_degrees(stop);
        if start >= 4096 {
            start = 0;
        }
        if stop >= 4096 {
            stop = 4095;
        }
        self.set_analog_range_raw(start, stop)
    }

    /// Configures UVW output: pole-pair count, then the output mux.
    pub fn configure_uvw(&mut self, pole_pairs: u8) -> Result<(), Error> {
        self.set_pole_pairs(pole_pairs)?;
        self.set_output_type(OutputType::Uvw)
    }

    /// Configures ABZ output: Z pulse width, hysteresis and resolution,
    /// then the output mux.
    pub fn configure_abz(
        &mut self,
        pulses: u16,
        pulse_width: PulseWidth,
        hysteresis: Hysteresis,
    ) -> Result<(), Error> {
        self.set_pulse_width(pulse_width)?;
        self.set_hysteresis(hysteresis)?;
        self.set_pulses_per_revolution(pulses)?;
        self.set_output_type(OutputType::Abz)
    }

    /// Configures the OUT pin for analog output over the given range.
    pub fn configure_analog_output(&mut self, start: f32, stop: f32) -> Result<(), Error> {
        self.set_analog_range_degrees(start, stop)?;
        self.set_pin_mode(PinMode::Analog)
    }

    /// Configures the OUT pin for PWM output.
    pub fn configure_pwm_output(
        &mut self,
        frequency: PwmFrequency,
        polarity: PwmPolarity,
    ) -> Result<(), Error> {
        self.set_pin_mode(PinMode::Pwm)?;
        self.set_pwm_frequency(frequency)?;
        self.set_pwm_polarity(polarity)
    }

    /// Commits the current configuration to EEPROM as the power-on default.
    ///
    /// Writes the programming key and command, then blocks for the 600 ms
    /// the part needs to finish the burn.
    ///
    /// # Important Notes
    /// - The supply must be 4.5-5.5 V during the burn
    /// - The device must not be accessed until this returns
    pub fn program_eeprom<D>(&mut self, delay: &mut D) -> Result<(), Error>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.write_register(ProgrammingKey)?;
        self.write_register(ProgrammingCommand)?;
        delay.delay_ms(EEPROM_COMMIT_MS);
        Ok(())
    }
}

impl<I2C> Mt6701I2c<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    /// Asynchronously reads a register value from the device.
    ///
    /// This is the async version of [`read_register`](Mt6701I2c::read_register).
    pub async fn read_register_async<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();

        self.i2c
            .write_read(self.address, &[R::id()], raw_value.as_mut())
            .await
            .map_err(|_| Error::Bus)?;

        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Asynchronously writes a value to a device register.
    ///
    /// This is the async version of [`write_register`](Mt6701I2c::write_register).
    pub async fn write_register_async<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
    {
        let [value] = register.to_bytes().unwrap();

        self.i2c
            .write(self.address, &[R::id(), value])
            .await
            .map_err(|_| Error::Bus)
    }

    /// Asynchronously reads a register, applies `f` and writes it back.
    ///
    /// This is the async version of [`modify_register`](Mt6701I2c::modify_register).
    pub async fn modify_register_async<R, F>(&mut self, f: F) -> Result<(), Error>
    where
        R: ReadableRegister<IdType = u8>
            + WritableRegister<IdType = u8, Error = Infallible, Array = [u8; 1]>,
        F: FnOnce(&mut R),
    {
        let mut register = self.read_register_async::<R>().await?;
        f(&mut register);
        self.write_register_async(register).await
    }

    /// Asynchronously reads the raw angle.
    ///
    /// This is the async version of [`raw_angle`](Mt6701I2c::raw_angle).
    pub async fn raw_angle_async(&mut self) -> Result<u16, Error> {
        let high = self.read_register_async::<AngleHigh>().await?;
        let low = self.read_register_async::<AngleLow>().await?;
        Ok(raw_angle(high, low))
    }

    /// Asynchronously reads the angle in degrees.
    ///
    /// This is the async version of [`angle_degrees`](Mt6701I2c::angle_degrees).
    pub async fn angle_degrees_async(&mut self) -> Result<f32, Error> {
        self.raw_angle_async().await.map(degrees_from_raw)
    }

    /// Asynchronously selects ABZ or UVW output.
    ///
    /// This is the async version of [`set_output_type`](Mt6701I2c::set_output_type).
    pub async fn set_output_type_async(&mut self, output_type: OutputType) -> Result<(), Error> {
        self.modify_register_async::<OutputMux, _>(|reg| reg.output_type = output_type)
            .await
    }

    /// Asynchronously sets the counting direction.
    ///
    /// This is the async version of
    /// [`set_rotation_direction`](Mt6701I2c::set_rotation_direction).
    pub async fn set_rotation_direction_async(
        &mut self,
        direction: Direction,
    ) -> Result<(), Error> {
        self.modify_register_async::<OutputMux, _>(|reg| reg.direction = direction)
            .await
    }

    /// Asynchronously enables the complementary -A-B-Z outputs.
    ///
    /// This is the async version of
    /// [`set_nanbnz_enabled`](Mt6701I2c::set_nanbnz_enabled).
    pub async fn set_nanbnz_enabled_async(&mut self, enabled: bool) -> Result<(), Error> {
        self.modify_register_async::<UvwMux, _>(|reg| reg.nanbnz_enabled = enabled)
            .await
    }

    /// Asynchronously sets the UVW pole-pair count.
    ///
    /// This is the async version of [`set_pole_pairs`](Mt6701I2c::set_pole_pairs).
    pub async fn set_pole_pairs_async(&mut self, pole_pairs: u8) -> Result<(), Error> {
        if !(1..=16).contains(&pole_pairs) {
            return Err(Error::OutOfRange);
        }

        self.modify_register_async::<Resolution, _>(|reg| reg.uvw_resolution = pole_pairs - 1)
            .await
    }

    /// Asynchronously sets the ABZ resolution.
    ///
    /// This is the async version of
    /// [`set_pulses_per_revolution`](Mt6701I2c::set_pulses_per_revolution).
    pub async fn set_pulses_per_revolution_async(&mut self, pulses: u16) -> Result<(), Error> {
        if !(1..=1024).contains(&pulses) {
            return Err(Error::OutOfRange);
        }

        let value = pulses - 1;
        self.write_register_async(AbzResolutionLow { value: value as u8 })
            .await?;
        self.modify_register_async::<Resolution, _>(|reg| {
            reg.abz_resolution_high = (value >> 8) as u8
        })
        .await
    }

    /// Asynchronously sets the zero offset as a raw 12-bit value.
    ///
    /// This is the async version of [`set_zero_raw`](Mt6701I2c::set_zero_raw).
    pub async fn set_zero_raw_async(&mut self, zero: u16) -> Result<(), Error> {
        let zero = zero & 0x0FFF;

        self.write_register_async(ZeroLow { value: zero as u8 })
            .await?;
        self.modify_register_async::<ZeroHigh, _>(|reg| reg.zero_high = (zero >> 8) as u8)
            .await
    }

    /// Asynchronously sets the zero offset in degrees.
    ///
    /// This is the async version of [`set_zero_degrees`](Mt6701I2c::set_zero_degrees).
    pub async fn set_zero_degrees_async(&mut self, degrees: f32) -> Result<(), Error> {
        self.set_zero_raw_async(raw12_from_degrees(degrees)).await
    }

    /// Asynchronously sets the output hysteresis.
    ///
    /// This is the async version of [`set_hysteresis`](Mt6701I2c::set_hysteresis).
    pub async fn set_hysteresis_async(&mut self, hysteresis: Hysteresis) -> Result<(), Error> {
        self.modify_register_async::<HysteresisLow, _>(|reg| {
            reg.hysteresis_low = hysteresis.low_bits()
        })
        .await?;
        self.modify_register_async::<ZeroHigh, _>(|reg| reg.hysteresis_msb = hysteresis.msb())
            .await
    }

    /// Asynchronously sets the Z index pulse width.
    ///
    /// This is the async version of [`set_pulse_width`](Mt6701I2c::set_pulse_width).
    pub async fn set_pulse_width_async(&mut self, pulse_width: PulseWidth) -> Result<(), Error> {
        self.modify_register_async::<ZeroHigh, _>(|reg| reg.pulse_width = pulse_width)
            .await
    }

    /// Asynchronously sets the PWM carrier frequency.
    ///
    /// This is the async version of [`set_pwm_frequency`](Mt6701I2c::set_pwm_frequency).
    pub async fn set_pwm_frequency_async(&mut self, frequency: PwmFrequency) -> Result<(), Error> {
        self.modify_register_async::<OutputControl, _>(|reg| reg.pwm_frequency = frequency)
            .await
    }

    /// Asynchronously sets the PWM output polarity.
    ///
    /// This is the async version of [`set_pwm_polarity`](Mt6701I2c::set_pwm_polarity).
    pub async fn set_pwm_polarity_async(&mut self, polarity: PwmPolarity) -> Result<(), Error> {
        self.modify_register_async::<OutputControl, _>(|reg| reg.pwm_polarity = polarity)
            .await
    }

    /// Asynchronously selects analog or PWM output on the OUT pin.
    ///
    /// This is the async version of [`set_pin_mode`](Mt6701I2c::set_pin_mode).
    pub async fn set_pin_mode_async(&mut self, mode: PinMode) -> Result<(), Error> {
        self.modify_register_async::<OutputControl, _>(|reg| reg.pin_mode = mode)
            .await
    }

    /// Asynchronously sets the analog output range as raw 12-bit angles.
    ///
    /// This is the async version of
    /// [`set_analog_range_raw`](Mt6701I2c::set_analog_range_raw).
    pub async fn set_analog_range_raw_async(
        &mut self,
        start: u16,
        stop: u16,
    ) -> Result<(), Error> {
        if start >= 4096 || stop >= 4096 {
            return Err(Error::OutOfRange);
        }

        self.write_register_async(AnalogStartLow { value: start as u8 })
            .await?;
        self.write_register_async(AnalogStopLow { value: stop as u8 })
            .await?;
        self.write_register_async(AnalogRangeHigh {
            start_high: (start >> 8) as u8,
            stop_high: (stop >> 8) as u8,
        })
        .await
    }

    /// Asynchronously sets the analog output range in degrees.
    ///
    /// This is the async version of
    /// [`set_analog_range_degrees`](Mt6701I2c::set_analog_range_degrees).
    pub async fn set_analog_range_degrees_async(
        &mut self,
        start: f32,
        stop: f32,
    ) -> Result<(), Error> {
        let mut start = raw12_from_degrees(start);
        let mut stop = raw12_from_degrees(stop);
        if start >= 4096 {
            start = 0;
        }
        if stop >= 4096 {
            stop = 4095;
        }
        self.set_analog_range_raw_async(start, stop).await
    }

    /// Asynchronously configures UVW output.
    ///
    /// This is the async version of [`configure_uvw`](Mt6701I2c::configure_uvw).
    pub async fn configure_uvw_async(&mut self, pole_pairs: u8) -> Result<(), Error> {
        self.set_pole_pairs_async(pole_pairs).await?;
        self.set_output_type_async(OutputType::Uvw).await
    }

    /// Asynchronously configures ABZ output.
    ///
    /// This is the async version of [`configure_abz`](Mt6701I2c::configure_abz).
    pub async fn configure_abz_async(
        &mut self,
        pulses: u16,
        pulse_width: PulseWidth,
        hysteresis: Hysteresis,
    ) -> Result<(), Error> {
        self.set_pulse_width_async(pulse_width).await?;
        self.set_hysteresis_async(hysteresis).await?;
        self.set_pulses_per_revolution_async(pulses).await?;
        self.set_output_type_async(OutputType::Abz).await
    }

    /// Asynchronously configures the OUT pin for analog output.
    ///
    /// This is the async version of
    /// [`configure_analog_output`](Mt6701I2c::configure_analog_output).
    pub async fn configure_analog_output_async(
        &mut self,
        start: f32,
        stop: f32,
    ) -> Result<(), Error> {
        self.set_analog_range_degrees_async(start, stop).await?;
        self.set_pin_mode_async(PinMode::Analog).await
    }

    /// Asynchronously configures the OUT pin for PWM output.
    ///
    /// This is the async version of
    /// [`configure_pwm_output`](Mt6701I2c::configure_pwm_output).
    pub async fn configure_pwm_output_async(
        &mut self,
        frequency: PwmFrequency,
        polarity: PwmPolarity,
    ) -> Result<(), Error> {
        self.set_pin_mode_async(PinMode::Pwm).await?;
        self.set_pwm_frequency_async(frequency).await?;
        self.set_pwm_polarity_async(polarity).await
    }

    /// Asynchronously commits the current configuration to EEPROM.
    ///
    /// This is the async version of [`program_eeprom`](Mt6701I2c::program_eeprom).
    pub async fn program_eeprom_async<D>(&mut self, delay: &mut D) -> Result<(), Error>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        self.write_register_async(ProgrammingKey).await?;
        self.write_register_async(ProgrammingCommand).await?;
        delay.delay_ms(EEPROM_COMMIT_MS).await;
        Ok(())
    }
}

/// Serial-bus handle for the MT6701.
///
/// Wraps an SPI device configured for [`SSI_MODE`] and reads the 24-bit
/// burst frame. The SSI interface is read-only: configuration is only
/// reachable over the register bus.
pub struct Mt6701Ssi<SPI> {
    spi: SPI,
}

impl<SPI> Mt6701Ssi<SPI> {
    /// Creates a handle wrapping the provided SPI device.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Mt6701Ssi<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Reads one frame from the device.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn read_frame(&mut self) -> Result<SsiFrame, Error> {
        let mut raw = [0u8; 3];
        self.spi.read(&mut raw).map_err(|_| Error::Bus)?;
        Ok(SsiFrame::from_bytes(raw).unwrap())
    }

    /// Reads the raw angle, in [0, 16383] over one revolution.
    pub fn raw_angle(&mut self) -> Result<u16, Error> {
        self.read_frame().map(|frame| frame.raw_angle)
    }

    /// Reads the angle in degrees, in [0, 360).
    pub fn angle_degrees(&mut self) -> Result<f32, Error> {
        self.read_frame().map(|frame| frame.angle_degrees())
    }

    /// Reads the magnetic field status.
    pub fn field_status(&mut self) -> Result<FieldStatus, Error> {
        self.read_frame().map(|frame| frame.field_status)
    }

    /// Reads the push-button flag.
    pub fn button_pressed(&mut self) -> Result<bool, Error> {
        self.read_frame().map(|frame| frame.button_pressed())
    }

    /// Reads the track-loss flag.
    pub fn track_loss(&mut self) -> Result<bool, Error> {
        self.read_frame().map(|frame| frame.track_loss())
    }
}

impl<SPI> Mt6701Ssi<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice,
{
    /// Asynchronously reads one frame from the device.
    ///
    /// This is the async version of [`read_frame`](Mt6701Ssi::read_frame).
    pub async fn read_frame_async(&mut self) -> Result<SsiFrame, Error> {
        let mut raw = [0u8; 3];
        self.spi.read(&mut raw).await.map_err(|_| Error::Bus)?;
        Ok(SsiFrame::from_bytes(raw).unwrap())
    }

    /// Asynchronously reads the raw angle.
    ///
    /// This is the async version of [`raw_angle`](Mt6701Ssi::raw_angle).
    pub async fn raw_angle_async(&mut self) -> Result<u16, Error> {
        self.read_frame_async().await.map(|frame| frame.raw_angle)
    }

    /// Asynchronously reads the angle in degrees.
    ///
    /// This is the async version of [`angle_degrees`](Mt6701Ssi::angle_degrees).
    pub async fn angle_degrees_async(&mut self) -> Result<f32, Error> {
        self.read_frame_async()
            .await
            .map(|frame| frame.angle_degrees())
    }

    /// Asynchronously reads the magnetic field status.
    ///
    /// This is the async version of [`field_status`](Mt6701Ssi::field_status).
    pub async fn field_status_async(&mut self) -> Result<FieldStatus, Error> {
        self.read_frame_async()
            .await
            .map(|frame| frame.field_status)
    }

    /// Asynchronously reads the push-button flag.
    ///
    /// This is the async version of [`button_pressed`](Mt6701Ssi::button_pressed).
    pub async fn button_pressed_async(&mut self) -> Result<bool, Error> {
        self.read_frame_async()
            .await
            .map(|frame| frame.button_pressed())
    }

    /// Asynchronously reads the track-loss flag.
    ///
    /// This is the async version of [`track_loss`](Mt6701Ssi::track_loss).
    pub async fn track_loss_async(&mut self) -> Result<bool, Error> {
        self.read_frame_async()
            .await
            .map(|frame| frame.track_loss())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-device I2C bus fake backed by a flat register file.
    ///
    /// The first byte of every write selects the register; subsequent
    /// bytes (or a following read) target consecutive addresses.
    struct FakeI2c {
        registers: [u8; 0x41],
    }

    impl FakeI2c {
        fn new() -> Self {
            Self {
                registers: [0; 0x41],
            }
        }
    }

    impl embedded_hal::i2c::ErrorType for FakeI2c {
        type Error = embedded_hal::i2c::ErrorKind;
    }

    impl embedded_hal::i2c::I2c for FakeI2c {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [embedded_hal::i2c::Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut current = 0usize;
            for operation in operations {
                match operation {
                    embedded_hal::i2c::Operation::Write(bytes) => {
                        current = bytes[0] as usize;
                        for (offset, value) in bytes[1..].iter().enumerate() {
                            self.registers[current + offset] = *value;
                        }
                    }
                    embedded_hal::i2c::Operation::Read(buffer) => {
                        for (offset, slot) in buffer.iter_mut().enumerate() {
                            *slot = self.registers[current + offset];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    /// I2C bus fake that fails every transaction.
    struct BrokenI2c;

    impl embedded_hal::i2c::ErrorType for BrokenI2c {
        type Error = embedded_hal::i2c::ErrorKind;
    }

    impl embedded_hal::i2c::I2c for BrokenI2c {
        fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [embedded_hal::i2c::Operation<'_>],
        ) -> Result<(), Self::Error> {
            Err(embedded_hal::i2c::ErrorKind::Other)
        }
    }

    struct FakeSpi {
        frame: [u8; 3],
    }

    impl embedded_hal::spi::ErrorType for FakeSpi {
        type Error = embedded_hal::spi::ErrorKind;
    }

    impl embedded_hal::spi::SpiDevice for FakeSpi {
        fn transaction(
            &mut self,
            operations: &mut [embedded_hal::spi::Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            for operation in operations {
                if let embedded_hal::spi::Operation::Read(buffer) = operation {
                    buffer.copy_from_slice(&self.frame[..buffer.len()]);
                }
            }
            Ok(())
        }
    }

    struct RecordingDelay {
        total_ns: u64,
    }

    impl embedded_hal::delay::DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn device() -> Mt6701I2c<FakeI2c> {
        Mt6701I2c::new(FakeI2c::new())
    }

    #[test]
    fn raw_angle_combines_register_halves() {
        let mut encoder = device();
        encoder.i2c.registers[0x03] = 0xAB;
        encoder.i2c.registers[0x04] = 0b1101_1100;

        assert_eq!(encoder.raw_angle().unwrap(), 10999);
        assert_eq!(
            encoder.angle_degrees().unwrap(),
            10999.0 * (360.0 / 16384.0)
        );
    }

    #[test]
    fn set_zero_raw_splits_and_preserves_siblings() {
        let mut encoder = device();
        encoder.i2c.registers[0x32] = 0b1010_0000;

        encoder.set_zero_raw(0xABC).unwrap();

        assert_eq!(encoder.i2c.registers[0x33], 0xBC);
        assert_eq!(encoder.i2c.registers[0x32], 0b1010_1010);
    }

    #[test]
    fn set_zero_raw_masks_to_12_bits() {
        let mut encoder = device();

        encoder.set_zero_raw(0xFABC).unwrap();

        assert_eq!(encoder.i2c.registers[0x33], 0xBC);
        assert_eq!(encoder.i2c.registers[0x32], 0x0A);
    }

    #[test]
    fn pole_pairs_are_stored_minus_one() {
        let mut encoder = device();
        encoder.i2c.registers[0x30] = 0b0000_0111;

        encoder.set_pole_pairs(7).unwrap();

        assert_eq!(encoder.i2c.registers[0x30], 0b0110_0111);
        assert_eq!(encoder.set_pole_pairs(0), Err(Error::OutOfRange));
        assert_eq!(encoder.set_pole_pairs(17), Err(Error::OutOfRange));
    }

    #[test]
    fn abz_resolution_spans_two_registers() {
        let mut encoder = device();

        encoder.set_pulses_per_revolution(1024).unwrap();

        assert_eq!(encoder.i2c.registers[0x31], 0xFF);
        assert_eq!(encoder.i2c.registers[0x30], 0b0000_0011);
        assert_eq!(
            encoder.set_pulses_per_revolution(1025),
            Err(Error::OutOfRange)
        );
        assert_eq!(encoder.set_pulses_per_revolution(0), Err(Error::OutOfRange));
    }

    #[test]
    fn hysteresis_splits_across_registers() {
        let mut encoder = device();
        encoder.i2c.registers[0x34] = 0b0000_1111;

        encoder.set_hysteresis(Hysteresis::QuarterLsb).unwrap();

        assert_eq!(encoder.i2c.registers[0x34], 0b0100_1111);
        assert_eq!(encoder.i2c.registers[0x32], 0b1000_0000);
    }

    #[test]
    fn analog_range_is_validated_then_split() {
        let mut encoder = device();

        assert_eq!(
            encoder.set_analog_range_raw(4096, 0),
            Err(Error::OutOfRange)
        );
        assert_eq!(
            encoder.set_analog_range_raw(0, 4096),
            Err(Error::OutOfRange)
        );

        encoder.set_analog_range_raw(0x123, 0xF45).unwrap();
        assert_eq!(encoder.i2c.registers[0x3F], 0x23);
        assert_eq!(encoder.i2c.registers[0x40], 0x45);
        assert_eq!(encoder.i2c.registers[0x3E], 0xF1);
    }

    #[test]
    fn analog_degrees_clamp_like_the_hardware_expects() {
        let mut encoder = device();

        encoder.set_analog_range_degrees(380.0, 720.0).unwrap();

        // Start clamps to 0, stop clamps to full scale.
        assert_eq!(encoder.i2c.registers[0x3F], 0x00);
        assert_eq!(encoder.i2c.registers[0x40], 0xFF);
        assert_eq!(encoder.i2c.registers[0x3E], 0xF0);
    }

    #[test]
    fn eeprom_burn_sequence_and_settle_time() {
        let mut encoder = device();
        let mut delay = RecordingDelay { total_ns: 0 };

        encoder.program_eeprom(&mut delay).unwrap();

        assert_eq!(encoder.i2c.registers[0x09], 0xB3);
        assert_eq!(encoder.i2c.registers[0x0A], 0x05);
        assert_eq!(delay.total_ns, 600_000_000);
    }

    #[test]
    fn transport_failures_surface_as_bus_errors() {
        let mut encoder = Mt6701I2c::new(BrokenI2c);

        assert_eq!(encoder.raw_angle(), Err(Error::Bus));
        assert_eq!(encoder.set_zero_raw(0x123), Err(Error::Bus));
        assert_eq!(
            encoder.set_rotation_direction(Direction::Clockwise),
            Err(Error::Bus)
        );
    }

    #[test]
    fn reserved_pulse_width_is_a_deserialization_error() {
        let mut encoder = device();
        // Code 0x7 in bits 6:4 of register 0x32 has no PulseWidth mapping.
        encoder.i2c.registers[0x32] = 0b0111_0000;

        assert_eq!(encoder.set_zero_raw(0x123), Err(Error::Deserialization));
        assert_eq!(
            encoder.set_pulse_width(PulseWidth::OneLsb),
            Err(Error::Deserialization)
        );
    }

    #[test]
    fn output_mux_setters_leave_other_fields_alone() {
        let mut encoder = device();
        encoder.i2c.registers[0x29] = 0b1000_0001;

        encoder.set_output_type(OutputType::Uvw).unwrap();
        encoder
            .set_rotation_direction(Direction::CounterClockwise)
            .unwrap();

        assert_eq!(encoder.i2c.registers[0x29], 0b1100_0011);
    }

    #[test]
    fn ssi_frame_readout() {
        let mut encoder = Mt6701Ssi::new(FakeSpi {
            frame: [0xAB, 0b1101_1110, 0b0100_0000],
        });

        let frame = encoder.read_frame().unwrap();
        assert_eq!(frame.raw_angle, 10999);
        assert_eq!(frame.field_status, FieldStatus::TooStrong);
        assert!(!frame.button_pressed());
        assert!(frame.track_loss());

        assert_eq!(encoder.raw_angle().unwrap(), 10999);
        assert_eq!(encoder.field_status().unwrap(), FieldStatus::TooStrong);
        assert!(encoder.track_loss().unwrap());
        assert!(!encoder.button_pressed().unwrap());
    }
}
