use embedded_hal::i2c::I2c;
use embedded_hal_0_2::blocking::i2c::{Write, WriteRead};

/// Borrows an embedded-hal 1.0 bus for drivers still written against the 0.2
/// blocking traits. Dropping it hands the bus back.
pub struct LegacyI2c<'a, B> {
    bus: &'a mut B
}

impl<'a, B: I2c> LegacyI2c<'a, B> {
    pub fn new(bus: &'a mut B) -> Self {
        LegacyI2c { bus }
    }
}

impl<'a, B: I2c> Write for LegacyI2c<'a, B> {
    type Error = B::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        I2c::write(&mut *self.bus, address, bytes)
    }
}

impl<'a, B: I2c> WriteRead for LegacyI2c<'a, B> {
    type Error = B::Error;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        I2c::write_read(&mut *self.bus, address, bytes, buffer)
    }
}
