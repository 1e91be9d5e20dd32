use log::debug;
use strum::{Display, EnumIter, EnumString};
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::bus::TransportError;
use crate::errors::HalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Motor {
    A,
    B,
}

/// Anything that names a motor: a [`Motor`] or its name (`"a"`, `"B"`, ...).
pub trait IntoMotor {
    fn into_motor(self) -> Result<Motor, HalError>;
}

impl IntoMotor for Motor {
    fn into_motor(self) -> Result<Motor, HalError> {
        Ok(self)
    }
}

impl IntoMotor for &str {
    fn into_motor(self) -> Result<Motor, HalError> {
        self.parse().map_err(|_| {
            HalError::InvalidArgument(format!("motor should be in (\"a\", \"b\"), got \"{}\"", self))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Splits a speed into direction and duty cycle. Out of range speeds are
/// clamped to [-1, 1]; zero drives forward with no duty.
pub fn encode_speed(speed: f64) -> (Direction, f64) {
    let speed = speed.clamp(-1.0, 1.0);
    let direction = match speed < 0.0 {
        true => Direction::Reverse,
        false => Direction::Forward,
    };

    (direction, speed.abs())
}

pub struct MotorLines<O, W> {
    pub in1: O,
    pub in2: O,
    pub pwm: W,
}

impl<O: OutputPin, W: SetDutyCycle> MotorLines<O, W> {
    pub fn new(in1: O, in2: O, pwm: W) -> Self {
        Self { in1, in2, pwm }
    }
}

/// Dual H-bridge: two motors sharing one standby line.
pub struct MotorController<O, W> {
    standby: O,
    motor_a: MotorLines<O, W>,
    motor_b: MotorLines<O, W>,
}

fn set_high<O: OutputPin>(line: &mut O) -> Result<(), HalError> {
    line.set_high().map_err(|e| TransportError::line(e).into())
}

fn set_low<O: OutputPin>(line: &mut O) -> Result<(), HalError> {
    line.set_low().map_err(|e| TransportError::line(e).into())
}

/// Scales `duty_cycle` in [0, 1] onto the output's duty range.
fn set_duty<W: SetDutyCycle>(pwm: &mut W, duty_cycle: f64) -> Result<(), HalError> {
    let duty = (duty_cycle * f64::from(pwm.max_duty_cycle())).round() as u16;
    pwm.set_duty_cycle(duty).map_err(|e| TransportError::duty(e).into())
}

impl<O: OutputPin, W: SetDutyCycle> MotorController<O, W> {
    pub fn new(standby: O, motor_a: MotorLines<O, W>, motor_b: MotorLines<O, W>) -> Self {
        Self { standby, motor_a, motor_b }
    }

    fn lines_mut(&mut self, motor: Motor) -> &mut MotorLines<O, W> {
        match motor {
            Motor::A => &mut self.motor_a,
            Motor::B => &mut self.motor_b,
        }
    }

    pub fn set_speed<M: IntoMotor>(&mut self, motor: M, speed: f64) -> Result<(), HalError> {
        let motor = motor.into_motor()?;
        if speed.is_nan() {
            return Err(HalError::InvalidArgument(format!("speed for motor {} is not a number", motor)));
        }

        let (direction, duty_cycle) = encode_speed(speed);
        set_high(&mut self.standby)?;

        let lines = self.lines_mut(motor);
        match direction {
            Direction::Reverse => {
                set_low(&mut lines.in1)?;
                set_high(&mut lines.in2)?;
            }
            Direction::Forward => {
                set_high(&mut lines.in1)?;
                set_low(&mut lines.in2)?;
            }
        }
        set_duty(&mut lines.pwm, duty_cycle)?;

        debug!("motor {}: {:?} at duty cycle {:.3}", motor, direction, duty_cycle);
        Ok(())
    }

    /// Drives both direction lines high, which brakes the motor. PWM and
    /// standby are left as they are.
    pub fn short_brake<M: IntoMotor>(&mut self, motor: M) -> Result<(), HalError> {
        let motor = motor.into_motor()?;
        let lines = self.lines_mut(motor);
        set_high(&mut lines.in1)?;
        set_high(&mut lines.in2)?;

        debug!("motor {}: short brake", motor);
        Ok(())
    }

    /// Zeroes both duty cycles and puts the driver in standby.
    pub fn stop(&mut self) -> Result<(), HalError> {
        set_duty(&mut self.motor_a.pwm, 0.0)?;
        set_duty(&mut self.motor_b.pwm, 0.0)?;
        set_low(&mut self.standby)?;

        debug!("motors stopped, driver in standby");
        Ok(())
    }
}
