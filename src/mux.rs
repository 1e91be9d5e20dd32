use log::debug;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use embedded_hal::i2c::I2c;

use crate::bus::TransportError;
use crate::errors::HalError;

pub const DEFAULT_MUX_ADDRESS: u8 = 0x70;
// See http://www.ti.com/lit/ds/symlink/tca9548a.pdf
pub const CHANNEL_SELECT_REGISTER: u8 = 0x04;

/// Downstream sensor positions wired to the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SensorChannel {
    Gu2,
    Gu3,
    Gu4,
    Gu5,
    Fu1,
    Fu2,
    Fu4,
}

impl SensorChannel {
    pub const fn mask(self) -> u8 {
        match self {
            SensorChannel::Gu2 => 0x01,
            SensorChannel::Gu3 => 0x02,
            SensorChannel::Gu4 => 0x04,
            SensorChannel::Gu5 => 0x08,
            SensorChannel::Fu1 => 0x10,
            SensorChannel::Fu2 => 0x20,
            SensorChannel::Fu4 => 0x40,
        }
    }
}

/// Anything that names a sensor channel: a [`SensorChannel`] or its name.
pub trait IntoChannel {
    fn into_channel(self) -> Result<SensorChannel, HalError>;
}

impl IntoChannel for SensorChannel {
    fn into_channel(self) -> Result<SensorChannel, HalError> {
        Ok(self)
    }
}

impl IntoChannel for &str {
    fn into_channel(self) -> Result<SensorChannel, HalError> {
        self.parse().map_err(|_| {
            let known: Vec<String> = SensorChannel::iter().map(|c| c.to_string()).collect();
            HalError::InvalidArgument(format!("channel should be one of [{}], got \"{}\"", known.join(", "), self))
        })
    }
}

/// I2C multiplexer routing the shared bus to one sensor at a time.
#[derive(Debug, Clone, Copy)]
pub struct Multiplexer {
    address: u8,
    register: u8,
}

impl Default for Multiplexer {
    fn default() -> Self {
        Self::new(DEFAULT_MUX_ADDRESS, CHANNEL_SELECT_REGISTER)
    }
}

impl Multiplexer {
    pub fn new(address: u8, register: u8) -> Self {
        Self { address, register }
    }

    /// Routes the bus to `channel` with a single register write. Bus errors are
    /// returned as-is.
    pub fn select<B: I2c, C: IntoChannel>(&self, bus: &mut B, channel: C) -> Result<SensorChannel, HalError> {
        let channel = channel.into_channel()?;
        bus.write(self.address, &[self.register, channel.mask()])
            .map_err(TransportError::bus)?;

        debug!("mux {:#04x}: selected channel {} (mask {:#04x})", self.address, channel, channel.mask());
        Ok(channel)
    }
}
