use std::collections::HashMap;
use std::fmt::Display;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use log::{debug, info, warn};
use parking_lot::{MappedRwLockWriteGuard, RwLock, RwLockWriteGuard};
use rppal::gpio::OutputPin;
use rppal::hal::Delay;

use crate::bus::i2c::{I2CBusController, I2CPinDefinition, SharedI2c};
use crate::bus::pwm::{PWMBusController, PwmOutput};
use crate::bus::raw::{OutputMode, RawBusController};
use crate::bus::BusController;
use crate::config::{Configuration, MotorLinesConfig, PwmOutputConfig};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::led::LedBank;
use crate::drivers::motor::{MotorController, MotorLines};
use crate::errors::HalError;
use crate::gpio::GpioBorrowChecker;
use crate::mux::Multiplexer;
use crate::sensor::{SensorReader, SensorSettings};

#[derive(Debug, PartialEq)]
pub enum RegistryError {
    MissingController(String),
    DuplicateController(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            RegistryError::MissingController(name) => format!("bus controller \"{}\" was unavailable", name),
            RegistryError::DuplicateController(name) => format!("controller \"{}\" of the same type is already registered", name),
        })
    }
}

impl std::error::Error for RegistryError {}

/// Process-wide owner of the GPIO leases and bus controllers. Components get
/// their lines from here once, at build time.
pub struct HardwareRegistry {
    gpio_borrow: Arc<RwLock<GpioBorrowChecker>>,
    bus_controllers: Vec<Arc<RwLock<dyn BusController>>>,
}

impl HardwareRegistry {
    pub fn new(gpio_borrow: &Arc<RwLock<GpioBorrowChecker>>) -> Self {
        HardwareRegistry {
            gpio_borrow: gpio_borrow.clone(),
            bus_controllers: Vec::new(),
        }
    }

    pub fn register_bus<T: BusController>(&mut self, bus: T) -> Result<(), RegistryError> {
        if self.has_bus::<T>() {
            return Err(RegistryError::DuplicateController(bus.name()));
        }

        debug!("registered bus controller {}", bus.name());
        self.bus_controllers.push(Arc::new(RwLock::new(bus)));
        Ok(())
    }

    pub fn get_bus_mut<T: BusController>(&self) -> Option<MappedRwLockWriteGuard<'_, T>> {
        for controller in &self.bus_controllers {
            if controller.is_locked() {
                warn!("cannot access controller because it is already borrowed, all outstanding references must be dropped first to prevent a deadlock");
                continue;
            }

            let r = controller.write();
            if (*r).as_any().is::<T>() {
                return RwLockWriteGuard::try_map(r, |x| x.as_any_mut().downcast_mut::<T>()).ok();
            }
        }

        None
    }

    pub fn has_bus<T: BusController>(&self) -> bool {
        self.bus_controllers.iter().any(|controller| controller.read().as_any().is::<T>())
    }

    pub fn bus_names(&self) -> Vec<String> {
        self.bus_controllers.iter().map(|c| c.read().name()).collect()
    }

    /// Leased BCM lines as (BCM, header pin), sorted by BCM.
    pub fn leased_lines(&self) -> Vec<(u8, u8)> {
        let checker = self.gpio_borrow.read();
        let mut lines: Vec<(u8, u8)> = checker
            .get_borrowed()
            .iter()
            .map(|state| (state.bcm_id(), state.header_pin()))
            .collect();
        lines.sort();
        lines
    }

    fn controller<T: BusController>(&self, name: &str) -> Result<MappedRwLockWriteGuard<'_, T>, RegistryError> {
        self.get_bus_mut::<T>()
            .ok_or_else(|| RegistryError::MissingController(name.to_string()))
    }
}

/// All robot components, each owning the lines it drives.
pub struct Robot<O, W, B, D> {
    pub motors: MotorController<O, W>,
    pub sensors: SensorReader<B, D>,
    pub buzzer: Buzzer<O, D>,
    pub leds: LedBank<O>,
}

pub type RpiRobot = Robot<OutputPin, PwmOutput, SharedI2c, Delay>;

/// A built robot together with the registry that holds its leases.
pub struct RobotHandle {
    registry: HardwareRegistry,
    robot: RpiRobot,
}

impl RobotHandle {
    pub fn registry(&self) -> &HardwareRegistry {
        &self.registry
    }
}

impl Deref for RobotHandle {
    type Target = RpiRobot;

    fn deref(&self) -> &Self::Target {
        &self.robot
    }
}

impl DerefMut for RobotHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.robot
    }
}

pub struct RobotBuilder {
    config: Configuration,
}

impl RobotBuilder {
    pub fn configure(config: Configuration) -> Self {
        RobotBuilder { config }
    }

    pub fn build(self) -> Result<RobotHandle, HalError> {
        let config = self.config;
        config.validate()?;

        let gpio_borrow = Arc::new(RwLock::new(GpioBorrowChecker::raspberry_pi()));
        let mut registry = HardwareRegistry::new(&gpio_borrow);

        let sensors = &config.sensor_section;
        let mut i2c_pins = HashMap::new();
        i2c_pins.insert(sensors.bus_id, I2CPinDefinition::new(sensors.sda_pin, sensors.scl_pin));

        let mut pwm_pins = HashMap::new();
        for lines in [&config.motor_section.motor_a, &config.motor_section.motor_b] {
            if let PwmOutputConfig::Hardware { channel, pin, .. } = lines.pwm {
                pwm_pins.insert(channel, pin);
            }
        }

        registry.register_bus(RawBusController::new(&gpio_borrow)?)?;
        registry.register_bus(I2CBusController::new(&gpio_borrow, i2c_pins)?)?;
        registry.register_bus(PWMBusController::new(&gpio_borrow, pwm_pins)?)?;

        let motors = Self::open_motors(&registry, &config)?;

        let bus = {
            let mut i2c = registry.controller::<I2CBusController>("I2C")?;
            let bus = i2c.get(sensors.bus_id)?;
            if let Some(lease) = i2c.lease_of(sensors.bus_id) {
                debug!("I2C bus {} opened under lease {}", sensors.bus_id, lease);
            }
            bus
        };
        let mux = Multiplexer::new(sensors.mux_address, sensors.mux_register);
        let sensor_reader = SensorReader::new(bus, mux, Delay::new(), SensorSettings::from(sensors));

        let (buzzer, leds) = {
            let mut gpio = registry.controller::<RawBusController>("RAW")?;
            let buzzer_config = &config.buzzer_section;
            let idle = match buzzer_config.active_high {
                true => OutputMode::LogicLow,
                false => OutputMode::LogicHigh,
            };
            let buzzer_line = gpio.open_out(buzzer_config.pin, idle)?;

            let mut led_lines = Vec::with_capacity(config.led_section.pins.len());
            for pin in &config.led_section.pins {
                led_lines.push(gpio.open_out(*pin, OutputMode::LogicLow)?);
            }

            (
                Buzzer::new(buzzer_line, buzzer_config.active_high, Delay::new()),
                LedBank::new(led_lines),
            )
        };

        info!(
            "robot hardware ready: controllers [{}], {} GPIO lines leased",
            registry.bus_names().join(", "),
            registry.leased_lines().len()
        );

        Ok(RobotHandle {
            registry,
            robot: Robot {
                motors,
                sensors: sensor_reader,
                buzzer,
                leds,
            },
        })
    }

    fn open_motors(registry: &HardwareRegistry, config: &Configuration) -> Result<MotorController<OutputPin, PwmOutput>, HalError> {
        let motors = &config.motor_section;
        let standby = registry
            .controller::<RawBusController>("RAW")?
            .open_out(motors.standby_pin, OutputMode::LogicLow)?;

        let motor_a = Self::open_motor_lines(registry, &motors.motor_a)?;
        let motor_b = Self::open_motor_lines(registry, &motors.motor_b)?;

        Ok(MotorController::new(standby, motor_a, motor_b))
    }

    fn open_motor_lines(registry: &HardwareRegistry, lines: &MotorLinesConfig) -> Result<MotorLines<OutputPin, PwmOutput>, HalError> {
        let (in1, in2) = {
            let mut gpio = registry.controller::<RawBusController>("RAW")?;
            (
                gpio.open_out(lines.in1_pin, OutputMode::LogicLow)?,
                gpio.open_out(lines.in2_pin, OutputMode::LogicLow)?,
            )
        };

        let pwm = match lines.pwm {
            PwmOutputConfig::Software { pin, frequency } => {
                let mut gpio = registry.controller::<RawBusController>("RAW")?;
                PwmOutput::Software(gpio.open_soft_pwm(pin, frequency)?)
            }
            PwmOutputConfig::Hardware { channel, frequency, .. } => {
                let mut pwm = registry.controller::<PWMBusController>("PWM")?;
                PwmOutput::Hardware(pwm.open(channel, frequency)?)
            }
        };

        Ok(MotorLines::new(in1, in2, pwm))
    }
}
