use std::fmt::Display;
use crate::bus::i2c::I2CError;
use crate::bus::pwm::PWMError;
use crate::bus::TransportError;
use crate::config::ConfigError;
use crate::gpio::GpioError;
use crate::registry::RegistryError;

#[derive(Debug, PartialEq)]
pub enum HalError {
    /// Rejected before any line or bus was touched.
    InvalidArgument(String),
    Transport(TransportError),
    Config(ConfigError),
    Registry(RegistryError)
}

impl HalError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, HalError::InvalidArgument(_))
    }
}

impl Display for HalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HalError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            HalError::Transport(e) => write!(f, "transport error: {}", e),
            HalError::Config(e) => write!(f, "config error: {}", e),
            HalError::Registry(e) => write!(f, "registry error: {}", e),
        }
    }
}

impl std::error::Error for HalError {}

impl From<TransportError> for HalError {
    fn from(err: TransportError) -> Self {
        HalError::Transport(err)
    }
}

impl From<GpioError> for HalError {
    fn from(err: GpioError) -> Self {
        HalError::Transport(TransportError::Gpio(err))
    }
}

impl From<I2CError> for HalError {
    fn from(err: I2CError) -> Self {
        HalError::Transport(TransportError::I2c(err))
    }
}

impl From<PWMError> for HalError {
    fn from(err: PWMError) -> Self {
        HalError::Transport(TransportError::Pwm(err))
    }
}

impl From<ConfigError> for HalError {
    fn from(err: ConfigError) -> Self {
        HalError::Config(err)
    }
}

impl From<RegistryError> for HalError {
    fn from(err: RegistryError) -> Self {
        HalError::Registry(err)
    }
}
