pub mod buzzer;
pub mod led;
pub mod motor;
