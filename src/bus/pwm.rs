use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use parking_lot::RwLock;
use rppal::pwm::{Channel, Polarity, Pwm, Error};
use uuid::Uuid;
use std::any::Any;
use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};
use crate::gpio::GpioBorrowChecker;
use crate::bus::BusController;
use crate::bus::raw::SoftPwm;

#[derive(Debug, PartialEq)]
pub enum PWMError {
    InvalidConfig(String),
    ChannelUnavailable(u8),
    Busy,
    HardwareError(String),
    Other(String)
}

impl Display for PWMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            PWMError::InvalidConfig(msg) => format!("invalid config: {}", msg),
            PWMError::ChannelUnavailable(channel) => format!("PWM channel {} is not available", channel),
            PWMError::Busy => format!("PWM channel is busy"),
            PWMError::HardwareError(msg) => format!("hardware error: {}", msg),
            PWMError::Other(msg) => format!("{}", msg),
        })
    }
}

impl std::error::Error for PWMError {}

impl embedded_hal::pwm::Error for PWMError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct PWMBusController {
    gpio_borrow: Arc<RwLock<GpioBorrowChecker>>,
    pin_config: HashMap<u8, u8>,
    owned_channels: HashMap<u8, Uuid>
}

impl BusController for PWMBusController {
    fn name(&self) -> String {
        "PWM".to_string()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn u8_to_channel(channel: u8) -> Option<Channel> {
    match channel {
        0 => Some(Channel::Pwm0),
        1 => Some(Channel::Pwm1),
        _ => None
    }
}

fn rppal_map_err(err: Error, default_err_msg: &str) -> PWMError {
    match err {
        Error::Io(e) => PWMError::HardwareError(format!("I/O error: {}", e)),
        _ => PWMError::Other(default_err_msg.to_string())
    }
}

/// PWM output of a motor, either bit-banged on a GPIO line or a hardware channel.
pub enum PwmOutput {
    Software(SoftPwm),
    Hardware(Pwm)
}

impl ErrorType for PwmOutput {
    type Error = PWMError;
}

impl SetDutyCycle for PwmOutput {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty_cycle = f64::from(duty) / f64::from(u16::MAX);
        match self {
            PwmOutput::Software(pwm) => pwm.set_duty_cycle(duty_cycle)
                .map_err(|err| PWMError::HardwareError(err.to_string())),
            PwmOutput::Hardware(pwm) => Pwm::set_duty_cycle(pwm, duty_cycle)
                .map_err(|err| rppal_map_err(err, "Internal RPPAL error while setting PWM duty cycle")),
        }
    }
}

impl PWMBusController {
    /// `pin_config` maps a hardware PWM channel to the BCM line it is routed to.
    pub fn new(gpio_borrow: &Arc<RwLock<GpioBorrowChecker>>, pin_config: HashMap<u8, u8>) -> Result<Self, PWMError> {
        let gpio_checker = gpio_borrow.read();

        for (channel, pin) in &pin_config {
            if u8_to_channel(*channel).is_none() {
                return Err(PWMError::InvalidConfig(
                    format!("Unsupported PWM channel: channel {} pin {}",
                    channel, pin
                )))
            }
            if !gpio_checker.has_pin(*pin) {
                return Err(PWMError::InvalidConfig(
                    format!("PWM channel is attempting to use invalid pin: channel {} pin {}",
                    channel, pin
                )));
            }

            for (other_channel, other_pin) in &pin_config {
                if channel != other_channel && pin == other_pin {
                    return Err(PWMError::InvalidConfig(
                        format!("PWM channel definitions overlap: channel {} -> {} with channel {} -> {}",
                        channel, pin, other_channel, other_pin
                    )))
                }
            }
        }

        drop(gpio_checker);
        Ok(PWMBusController {
            gpio_borrow: gpio_borrow.clone(),
            pin_config: pin_config,
            owned_channels: HashMap::new()
        })
    }

    /// Opens `channel` enabled at `frequency` Hz with a zero duty cycle.
    pub fn open(&mut self, channel: u8, frequency: f64) -> Result<Pwm, PWMError> {
        if self.owned_channels.contains_key(&channel) {
            return Err(PWMError::Busy);
        }

        let (pin, hw_channel) = match (self.pin_config.get(&channel), u8_to_channel(channel)) {
            (Some(p), Some(c)) => (*p, c),
            _ => return Err(PWMError::ChannelUnavailable(channel))
        };

        let mut borrow_checker = self.gpio_borrow.write();
        if !borrow_checker.can_borrow_one(pin) {
            return Err(PWMError::Busy);
        }

        let bus = Pwm::with_frequency(hw_channel, frequency, 0.0, Polarity::Normal, true)
            .map_err(|err| rppal_map_err(err, &format!("Internal RPPAL error while opening PWM channel {}", channel)))?;

        let borrow_id = borrow_checker.borrow_one(pin)
            .map_err(|err| PWMError::HardwareError(err.to_string()))?;

        self.owned_channels.insert(channel, borrow_id);
        Ok(bus)
    }
}
