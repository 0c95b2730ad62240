//! EEPROM programming registers
//!
//! Committing the configuration registers to EEPROM is a fixed two-write
//! sequence: the programming key, then the programming command. The part
//! needs 600 ms and a supply of 4.5-5.5 V to finish the burn.
//!
//! Both registers are write-only; each type serializes to its single magic
//! byte.

use core::convert::Infallible;

use regiface::{register, ToByteArray, WritableRegister};

/// EEPROM programming key register (address: 0x09)
///
/// Must be written with 0xB3 immediately before [`ProgrammingCommand`].
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, Default, WritableRegister)]
pub struct ProgrammingKey;

/// EEPROM programming command register (address: 0x0A)
///
/// Writing 0x05 after the key starts the burn. The device must not be
/// accessed for 600 ms afterwards.
#[register(0x0Au8)]
#[derive(Debug, Clone, Copy, Default, WritableRegister)]
pub struct ProgrammingCommand;

impl ToByteArray for ProgrammingKey {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([0xB3])
    }
}

impl ToByteArray for ProgrammingCommand {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([0x05])
    }
}
