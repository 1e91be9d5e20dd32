use log::debug;
use embedded_hal::digital::OutputPin;

use crate::bus::TransportError;
use crate::errors::HalError;

/// Status LEDs addressed by 1-based id.
pub struct LedBank<O> {
    lines: Vec<O>,
}

impl<O: OutputPin> LedBank<O> {
    pub fn new(lines: Vec<O>) -> Self {
        Self { lines }
    }

    pub fn count(&self) -> usize {
        self.lines.len()
    }

    fn line_mut(&mut self, led_id: usize) -> Result<&mut O, HalError> {
        let count = self.lines.len();
        match led_id.checked_sub(1).and_then(|index| self.lines.get_mut(index)) {
            Some(line) => Ok(line),
            None => Err(HalError::InvalidArgument(format!("led_id should be in (1, {}), got {}", count, led_id)))
        }
    }

    pub fn led_on(&mut self, led_id: usize) -> Result<(), HalError> {
        self.line_mut(led_id)?.set_high().map_err(TransportError::line)?;
        debug!("LED {}: on", led_id);
        Ok(())
    }

    pub fn led_off(&mut self, led_id: usize) -> Result<(), HalError> {
        self.line_mut(led_id)?.set_low().map_err(TransportError::line)?;
        debug!("LED {}: off", led_id);
        Ok(())
    }
}
