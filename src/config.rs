use std::fmt::Display;
use std::fs::File;
use std::path::Path;
use serde::{Serialize, Deserialize};
use std::io::{Read, Write};
use crate::sensor::SENSOR_ADDRESS;

const MAX_BCM_ID: u8 = 27;
const MAX_7BIT_ADDRESS: u8 = 0x7F;

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    IoError(String),
    SerializeError(String),
    InvalidEntry(String),
    DuplicateEntry(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            ConfigError::IoError(msg) => format!("could not read config: {}", msg),
            ConfigError::SerializeError(msg) => format!("serialize/parse error: {}", msg),
            ConfigError::InvalidEntry(msg) => format!("invalid config entry: {}", msg),
            ConfigError::DuplicateEntry(msg) => format!("duplicate config entry: {}", msg),
        })
    }
}

impl std::error::Error for ConfigError {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PwmOutputConfig {
    /// Software PWM on a plain GPIO line.
    Software { pin: u8, frequency: f64 },
    /// Hardware PWM channel (0 or 1) routed to `pin`.
    Hardware { channel: u8, pin: u8, frequency: f64 }
}

impl PwmOutputConfig {
    pub fn pin(&self) -> u8 {
        match self {
            PwmOutputConfig::Software { pin, .. } => *pin,
            PwmOutputConfig::Hardware { pin, .. } => *pin,
        }
    }

    pub fn frequency(&self) -> f64 {
        match self {
            PwmOutputConfig::Software { frequency, .. } => *frequency,
            PwmOutputConfig::Hardware { frequency, .. } => *frequency,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MotorLinesConfig {
    pub in1_pin: u8,
    pub in2_pin: u8,
    pub pwm: PwmOutputConfig
}

impl MotorLinesConfig {
    pub fn new(in1_pin: u8, in2_pin: u8, pwm_pin: u8) -> Self {
        Self {
            in1_pin,
            in2_pin,
            pwm: PwmOutputConfig::Software { pin: pwm_pin, frequency: 100.0 }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConfigSectionMotors {
    pub standby_pin: u8,
    pub motor_a: MotorLinesConfig,
    pub motor_b: MotorLinesConfig
}

impl Default for ConfigSectionMotors {
    fn default() -> Self {
        Self {
            standby_pin: 18,
            motor_a: MotorLinesConfig::new(27, 23, 22),
            motor_b: MotorLinesConfig::new(17, 15, 14),
        }
    }
}

impl ConfigSectionMotors {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, lines) in [("A", &self.motor_a), ("B", &self.motor_b)] {
            let frequency = lines.pwm.frequency();
            if !(frequency > 0.0) {
                return Err(ConfigError::InvalidEntry(
                    format!("motor {} PWM frequency must be greater than zero, got {}", name, frequency)
                ));
            }

            if let PwmOutputConfig::Hardware { channel, .. } = lines.pwm {
                if channel > 1 {
                    return Err(ConfigError::InvalidEntry(
                        format!("motor {} uses unsupported hardware PWM channel {}", name, channel)
                    ));
                }
            }
        }

        if let (PwmOutputConfig::Hardware { channel: a, .. }, PwmOutputConfig::Hardware { channel: b, .. }) = (&self.motor_a.pwm, &self.motor_b.pwm) {
            if a == b {
                return Err(ConfigError::DuplicateEntry(format!("hardware PWM channel {} is used by both motors", a)));
            }
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConfigSectionSensors {
    pub bus_id: u8,
    pub sda_pin: u8,
    pub scl_pin: u8,
    pub mux_address: u8,
    pub mux_register: u8,
    pub proximity_settle_ms: u64,
    pub light_settle_ms: u64,
    pub ground_threshold: u8
}

impl Default for ConfigSectionSensors {
    fn default() -> Self {
        Self {
            bus_id: 1,
            sda_pin: 2,
            scl_pin: 3,
            mux_address: 0x70,
            mux_register: 0x04,
            proximity_settle_ms: 10,
            light_settle_ms: 110,
            ground_threshold: 200,
        }
    }
}

impl ConfigSectionSensors {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sda_pin == self.scl_pin {
            return Err(ConfigError::InvalidEntry(
                format!("I2C bus {} uses BCM {} for both SDA and SCL", self.bus_id, self.sda_pin)
            ));
        }

        if self.mux_address > MAX_7BIT_ADDRESS {
            return Err(ConfigError::InvalidEntry(
                format!("multiplexer address {:#04x} is not a 7-bit I2C address", self.mux_address)
            ));
        }

        // APDS9960 parts answer at a fixed address
        if self.mux_address == SENSOR_ADDRESS {
            return Err(ConfigError::DuplicateEntry(
                format!("multiplexer and sensors share I2C address {:#04x}", self.mux_address)
            ));
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConfigSectionBuzzer {
    pub pin: u8,
    pub active_high: bool
}

impl Default for ConfigSectionBuzzer {
    fn default() -> Self {
        Self { pin: 13, active_high: false }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConfigSectionLeds {
    pub pins: Vec<u8>
}

impl Default for ConfigSectionLeds {
    fn default() -> Self {
        Self { pins: vec![5, 6] }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Configuration {
    pub motor_section: ConfigSectionMotors,
    pub sensor_section: ConfigSectionSensors,
    pub buzzer_section: ConfigSectionBuzzer,
    pub led_section: ConfigSectionLeds
}

impl Configuration {
    /// Every BCM line claimed by the wiring, paired with the role it plays.
    pub fn pin_roles(&self) -> Vec<(u8, String)> {
        let motors = &self.motor_section;
        let sensors = &self.sensor_section;
        let mut roles = vec![
            (motors.standby_pin, "STBY".to_string()),
            (motors.motor_a.in1_pin, "AIN1".to_string()),
            (motors.motor_a.in2_pin, "AIN2".to_string()),
            (motors.motor_a.pwm.pin(), "PWMA".to_string()),
            (motors.motor_b.in1_pin, "BIN1".to_string()),
            (motors.motor_b.in2_pin, "BIN2".to_string()),
            (motors.motor_b.pwm.pin(), "PWMB".to_string()),
            (sensors.sda_pin, "SDA".to_string()),
            (sensors.scl_pin, "SCL".to_string()),
            (self.buzzer_section.pin, "BUZZER".to_string()),
        ];

        for (index, pin) in self.led_section.pins.iter().enumerate() {
            roles.push((*pin, format!("LED{}", index + 1)));
        }

        roles
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut known: Vec<(u8, String)> = Vec::new();
        for (pin, role) in self.pin_roles() {
            if pin > MAX_BCM_ID {
                return Err(ConfigError::InvalidEntry(
                    format!("{} is assigned to BCM {}, which is not a header GPIO", role, pin)
                ));
            }

            if let Some((_, other)) = known.iter().find(|(p, _)| *p == pin) {
                return Err(ConfigError::DuplicateEntry(
                    format!("BCM {} is assigned to both {} and {}", pin, other, role)
                ));
            }

            known.push((pin, role));
        }

        self.motor_section.validate()?;
        self.sensor_section.validate()?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Configuration, ConfigError> {
        let config: Configuration = serde_json::from_reader(reader)
            .map_err(|e| ConfigError::SerializeError(format!("failed to deserialize config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_str(json_str: &str) -> Result<Configuration, ConfigError> {
        Self::from_reader(json_str.as_bytes())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Configuration, ConfigError> {
        let file = File::open(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.as_ref().display(), e)))?;

        Self::from_reader(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W, pretty: bool) -> Result<(), ConfigError> {
        let result = match pretty {
            true => serde_json::to_writer_pretty(writer, self),
            false => serde_json::to_writer(writer, self),
        };

        result.map_err(|e| ConfigError::SerializeError(format!("failed to serialize config: {}", e)))
    }

    pub fn to_str(&self, pretty: bool) -> Result<String, ConfigError> {
        let result = match pretty {
            true => serde_json::to_string_pretty(self),
            false => serde_json::to_string(self),
        };

        result.map_err(|e| ConfigError::SerializeError(format!("failed to serialize config: {}", e)))
    }
}
