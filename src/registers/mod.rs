//! Register definitions for the MT6701 encoder
//! Generated from the MT6701 datasheet register map
//!
//! Every configuration register is an EEPROM-backed byte that packs several
//! unrelated fields, so most types here decode the whole byte and carry the
//! undocumented bits along untouched. Read-modify-write through
//! [`Mt6701I2c::modify_register`](crate::Mt6701I2c::modify_register) is the
//! intended way to change a single field.

mod angle;
mod eeprom;
mod output;
mod tracking;

pub use angle::*;
pub use eeprom::*;
pub use output::*;
pub use tracking::*;
