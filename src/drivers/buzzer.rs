use std::time::Duration;
use log::debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::bus::TransportError;
use crate::delay::wait;
use crate::errors::HalError;

pub struct Buzzer<O, D> {
    line: O,
    active_high: bool,
    delay: D,
}

impl<O: OutputPin, D: DelayNs> Buzzer<O, D> {
    /// `line` is expected to already sit at its inactive level.
    pub fn new(line: O, active_high: bool, delay: D) -> Self {
        Self { line, active_high, delay }
    }

    /// Emits exactly one beep of `duration`, blocking until it is over.
    pub fn buzz(&mut self, duration: Duration) -> Result<(), HalError> {
        self.line.set_state(PinState::from(self.active_high))
            .map_err(TransportError::line)?;
        wait(&mut self.delay, duration);
        self.line.set_state(PinState::from(!self.active_high))
            .map_err(TransportError::line)?;

        debug!("buzzer: beeped for {:?}", duration);
        Ok(())
    }
}
