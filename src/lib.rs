pub mod bus;
pub mod config;
pub mod delay;
pub mod drivers;
pub mod errors;
pub mod gpio;
pub mod mux;
pub mod registry;
pub mod sensor;


pub use drivers::motor::Motor;
pub use errors::HalError;
pub use mux::SensorChannel;
pub use registry::{RobotBuilder, RobotHandle};
