use std::any::Any;
use std::fmt::Display;
use embedded_hal::digital;
use embedded_hal::i2c as hal_i2c;
use embedded_hal::pwm as hal_pwm;
use crate::gpio::GpioError;
use self::i2c::I2CError;
use self::pwm::PWMError;

pub trait BusController: Any + Send + Sync {
    fn name(&self) -> String;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Failure reported underneath a line or bus. The first three come from the
/// controllers while opening hardware, the rest from embedded-hal drivers at
/// runtime, kept as their error kind plus the driver's own description.
#[derive(Debug, PartialEq)]
pub enum TransportError {
    Gpio(GpioError),
    I2c(I2CError),
    Pwm(PWMError),
    Line(digital::ErrorKind, String),
    Bus(hal_i2c::ErrorKind, String),
    Duty(hal_pwm::ErrorKind, String)
}

impl TransportError {
    pub fn line<E: digital::Error>(err: E) -> Self {
        TransportError::Line(err.kind(), format!("{:?}", err))
    }

    pub fn bus<E: hal_i2c::Error>(err: E) -> Self {
        TransportError::Bus(err.kind(), format!("{:?}", err))
    }

    pub fn duty<E: hal_pwm::Error>(err: E) -> Self {
        TransportError::Duty(err.kind(), format!("{:?}", err))
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Gpio(e) => write!(f, "GPIO: {}", e),
            TransportError::I2c(e) => write!(f, "I2C: {}", e),
            TransportError::Pwm(e) => write!(f, "PWM: {}", e),
            TransportError::Line(kind, detail) => write!(f, "GPIO line ({:?}): {}", kind, detail),
            TransportError::Bus(kind, detail) => write!(f, "I2C bus ({:?}): {}", kind, detail),
            TransportError::Duty(kind, detail) => write!(f, "PWM output ({:?}): {}", kind, detail),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<GpioError> for TransportError {
    fn from(err: GpioError) -> Self {
        TransportError::Gpio(err)
    }
}

impl From<I2CError> for TransportError {
    fn from(err: I2CError) -> Self {
        TransportError::I2c(err)
    }
}

impl From<PWMError> for TransportError {
    fn from(err: PWMError) -> Self {
        TransportError::Pwm(err)
    }
}

// Bus implementations
pub mod raw; // RawBusController
pub mod i2c; // I2CBusController
pub mod pwm; // PWMBusController
pub mod legacy; // embedded-hal 0.2 view of a 1.0 bus
