use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use log::{info, warn, LevelFilter};
use rover_hal::config::Configuration;
use rover_hal::{RobotBuilder, SensorChannel};
use simple_logger::SimpleLogger;
use strum::IntoEnumIterator;

const CONFIG_ENV: &str = "ROVER_CONFIG";
const STATUS_LED: usize = 1;

fn load_config() -> Result<Configuration, Box<dyn Error>> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            Ok(Configuration::load(path)?)
        }
        Err(_) => {
            info!("{} is not set, using the reference wiring", CONFIG_ENV);
            Ok(Configuration::default())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new().with_level(LevelFilter::Info).env().init()?;

    let config = load_config()?;
    let mut robot = RobotBuilder::configure(config).build()?;
    for (bcm, header) in robot.registry().leased_lines() {
        info!("BCM {:>2} (header pin {:>2}) leased", bcm, header);
    }

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;

    robot.buzzer.buzz(Duration::from_millis(100))?;
    robot.leds.led_on(STATUS_LED)?;

    info!("Hardware check running, press Ctrl+C to stop");
    while running.load(Ordering::SeqCst) {
        for channel in SensorChannel::iter() {
            match robot.sensors.read_proximity(channel) {
                Ok(proximity) => info!("{}: proximity {}", channel, proximity),
                Err(e) => warn!("{}: {}", channel, e),
            }
        }

        std::thread::sleep(Duration::from_secs(1));
    }

    info!("Shutting down");
    if let Err(e) = robot.motors.stop() {
        warn!("Failed to stop motors: {}", e);
    }
    if let Err(e) = robot.leds.led_off(STATUS_LED) {
        warn!("Failed to turn off status LED: {}", e);
    }

    Ok(())
}
