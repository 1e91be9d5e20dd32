use crate::bus::BusController;
use crate::gpio::{GpioBorrowChecker, GpioError};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use uuid::Uuid;
use rppal::gpio::{Gpio, Pin, OutputPin, Error};

fn rppal_map_err(err: Error, default_err_msg: &str) -> GpioError {
    match err {
        Error::PinNotAvailable(p) => GpioError::PinNotFound(p),
        Error::PinUsed(p) => GpioError::Busy(p),
        Error::PermissionDenied(s) => GpioError::PermissionDenied(s),
        Error::Io(e) => GpioError::HardwareError(format!("I/O error: {}", e)),
        _ => GpioError::Other(String::from(default_err_msg))
    }
}

pub enum OutputMode {
    LogicHigh,
    LogicLow
}

/// Software PWM on a plain GPIO output.
pub struct SoftPwm {
    pin: OutputPin,
    frequency: f64
}

impl SoftPwm {
    pub fn new(pin: OutputPin, frequency: f64) -> Self {
        SoftPwm { pin, frequency }
    }

    /// `duty_cycle` is a fraction in [0, 1].
    pub fn set_duty_cycle(&mut self, duty_cycle: f64) -> Result<(), GpioError> {
        let pin = self.pin.pin();
        self.pin.set_pwm_frequency(self.frequency, duty_cycle)
            .map_err(|err| rppal_map_err(err, &format!("Internal RPPAL error while setting software PWM on BCM {}", pin)))
    }
}

pub struct RawBusController {
    gpio_controller: Gpio,
    gpio_borrow: Arc<RwLock<GpioBorrowChecker>>,
    owned_pins: HashMap<u8, Uuid>
}

impl BusController for RawBusController {
    fn name(&self) -> String {
        "RAW".to_string()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl RawBusController {
    pub fn new(gpio_borrow: &Arc<RwLock<GpioBorrowChecker>>) -> Result<Self, GpioError> {
        let gpio = Gpio::new()
            .map_err(|err| rppal_map_err(err, "Internal RPPAL error while initializing Gpio interface"))?;

        Ok(RawBusController {
            gpio_controller: gpio,
            gpio_borrow: gpio_borrow.clone(),
            owned_pins: HashMap::new()
        })
    }

    pub fn open_out(&mut self, pin: u8, mode: OutputMode) -> Result<OutputPin, GpioError> {
        if self.owned_pins.contains_key(&pin) {
            return Err(GpioError::Busy(pin));
        }

        let pin = self.borrow_pin(pin)?;
        Ok(match mode {
            OutputMode::LogicHigh => pin.into_output_high(),
            OutputMode::LogicLow => pin.into_output_low(),
        })
    }

    pub fn open_soft_pwm(&mut self, pin: u8, frequency: f64) -> Result<SoftPwm, GpioError> {
        let mut output = self.open_out(pin, OutputMode::LogicLow)?;
        output.set_pwm_frequency(frequency, 0.0)
            .map_err(|err| rppal_map_err(err, &format!("Internal RPPAL error while starting software PWM on BCM {}", pin)))?;

        Ok(SoftPwm::new(output, frequency))
    }

    fn borrow_pin(&mut self, bcm_id: u8) -> Result<Pin, GpioError> {
        let mut borrow_checker = self.gpio_borrow.write();
        borrow_checker.get(&bcm_id)?;

        if !borrow_checker.can_borrow_one(bcm_id) {
            return Err(GpioError::Busy(bcm_id));
        }

        let pin = self.gpio_controller.get(bcm_id)
            .map_err(|err| rppal_map_err(err, &format!("Internal RPPAL error while opening pin (BCM {})", bcm_id)))?;

        let borrow_id = borrow_checker.borrow_one(bcm_id)?;
        self.owned_pins.insert(bcm_id, borrow_id);
        Ok(pin)
    }
}
