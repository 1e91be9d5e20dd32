use std::time::Duration;
use apds9960::Apds9960;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::bus::i2c::I2CError;
use crate::bus::legacy::LegacyI2c;
use crate::bus::TransportError;
use crate::config::ConfigSectionSensors;
use crate::delay::wait;
use crate::errors::HalError;
use crate::mux::{IntoChannel, Multiplexer, SensorChannel};

/// Address every APDS9960 answers at once its channel is selected.
pub const SENSOR_ADDRESS: u8 = 0x39;
const SENSOR_IDS: [u8; 3] = [0xAB, 0x9C, 0xA8];

pub const DEFAULT_GROUND_THRESHOLD: u8 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub ambient: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSettings {
    pub proximity_settle: Duration,
    pub light_settle: Duration,
    pub ground_threshold: u8,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            proximity_settle: Duration::from_millis(10),
            light_settle: Duration::from_millis(110),
            ground_threshold: DEFAULT_GROUND_THRESHOLD,
        }
    }
}

impl From<&ConfigSectionSensors> for SensorSettings {
    fn from(config: &ConfigSectionSensors) -> Self {
        Self {
            proximity_settle: Duration::from_millis(config.proximity_settle_ms),
            light_settle: Duration::from_millis(config.light_settle_ms),
            ground_threshold: config.ground_threshold,
        }
    }
}

fn chip_error<E: embedded_hal::i2c::Error>(err: apds9960::Error<E>) -> HalError {
    #[allow(unreachable_patterns)]
    match err {
        apds9960::Error::I2C(e) => TransportError::bus(e).into(),
        _ => I2CError::Other("APDS9960 driver error".to_string()).into(),
    }
}

type Session<'a, B> = Apds9960<LegacyI2c<'a, B>>;

/// Starts a sensor session on the selected chip, refusing anything that does
/// not identify as an APDS9960.
fn open_session<B: I2c>(bus: &mut B) -> Result<Session<'_, B>, HalError> {
    let mut chip = Apds9960::new(LegacyI2c::new(bus));
    let id = chip.read_device_id().map_err(chip_error)?;
    if !SENSOR_IDS.contains(&id) {
        return Err(I2CError::UnexpectedDevice { address: SENSOR_ADDRESS, id }.into());
    }

    chip.enable().map_err(chip_error)?;
    Ok(chip)
}

/// Per-channel proximity and color queries. Every query selects its channel
/// first; the select and the read are not atomic, so all bus users must be
/// serialized by the caller.
pub struct SensorReader<B, D> {
    bus: B,
    mux: Multiplexer,
    delay: D,
    settings: SensorSettings,
}

impl<B: I2c, D: DelayNs> SensorReader<B, D> {
    pub fn new(bus: B, mux: Multiplexer, delay: D, settings: SensorSettings) -> Self {
        Self { bus, mux, delay, settings }
    }

    pub fn select_channel<C: IntoChannel>(&mut self, channel: C) -> Result<SensorChannel, HalError> {
        self.mux.select(&mut self.bus, channel)
    }

    pub fn read_proximity<C: IntoChannel>(&mut self, channel: C) -> Result<u8, HalError> {
        let channel = self.mux.select(&mut self.bus, channel)?;

        let mut chip = open_session(&mut self.bus)?;
        chip.enable_proximity().map_err(chip_error)?;
        wait(&mut self.delay, self.settings.proximity_settle);
        let proximity = nb::block!(chip.read_proximity()).map_err(chip_error)?;
        chip.destroy();

        debug!("sensor {}: proximity {}", channel, proximity);
        Ok(proximity)
    }

    pub fn read_color<C: IntoChannel>(&mut self, channel: C) -> Result<Color, HalError> {
        let channel = self.mux.select(&mut self.bus, channel)?;

        let mut chip = open_session(&mut self.bus)?;
        chip.enable_light().map_err(chip_error)?;
        wait(&mut self.delay, self.settings.light_settle);

        let red = nb::block!(chip.read_light_red()).map_err(chip_error)?;
        let green = nb::block!(chip.read_light_green()).map_err(chip_error)?;
        let blue = nb::block!(chip.read_light_blue()).map_err(chip_error)?;
        let ambient = nb::block!(chip.read_light_clear()).map_err(chip_error)?;
        chip.destroy();

        let color = Color { red, green, blue, ambient };
        debug!("sensor {}: {:?}", channel, color);
        Ok(color)
    }

    /// True when the sensor sees a reflective surface close by, i.e. the
    /// proximity reading is strictly above the ground threshold.
    pub fn is_grounded<C: IntoChannel>(&mut self, channel: C) -> Result<bool, HalError> {
        Ok(self.read_proximity(channel)? > self.settings.ground_threshold)
    }
}
