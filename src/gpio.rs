use std::{collections::HashMap, fmt::Display};
use uuid::Uuid;

// (BCM, physical header pin) for the 40-pin Raspberry Pi header
const HEADER_PINS: [(u8, u8); 28] = [
    (0, 27), (1, 28), (2, 3), (3, 5), (4, 7), (5, 29), (6, 31),
    (7, 26), (8, 24), (9, 21), (10, 19), (11, 23), (12, 32), (13, 33),
    (14, 8), (15, 10), (16, 36), (17, 11), (18, 12), (19, 35), (20, 38),
    (21, 40), (22, 15), (23, 16), (24, 18), (25, 22), (26, 37), (27, 13),
];

pub struct PinState {
    bcm_id: u8,
    header_pin: u8,
    leased: bool
}

impl PinState {
    pub fn new(bcm_id: u8, header_pin: u8) -> Self {
        PinState {
            bcm_id: bcm_id,
            header_pin: header_pin,
            leased: false
        }
    }

    pub fn bcm_id(&self) -> u8 {
        self.bcm_id
    }

    pub fn header_pin(&self) -> u8 {
        self.header_pin
    }

    pub fn is_leased(&self) -> bool {
        self.leased
    }
}

#[derive(Debug, PartialEq)]
pub enum GpioError {
    Busy(u8),
    PinNotFound(u8),
    PermissionDenied(String),
    HardwareError(String),
    Other(String)
}

impl Display for GpioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            GpioError::Busy(p) => format!("BCM line {} is busy", p),
            GpioError::PinNotFound(p) => format!("BCM line {} is not available", p),
            GpioError::PermissionDenied(s) => format!("permission denied: {}", s),
            GpioError::HardwareError(s) => format!("hardware error: {}", s),
            GpioError::Other(s) => format!("{}", s),
        })
    }
}

impl std::error::Error for GpioError {}

/// Tracks which BCM lines are owned by a bus controller so that no line is
/// bound to two roles at once.
pub struct GpioBorrowChecker {
    pins: HashMap<u8, PinState>,
    leases: HashMap<Uuid, Vec<u8>>
}

impl GpioBorrowChecker {
    pub fn new(pins: HashMap<u8, PinState>) -> Self {
        GpioBorrowChecker {
            pins: pins,
            leases: HashMap::new()
        }
    }

    /// Every user-accessible BCM line of the 40-pin header.
    pub fn raspberry_pi() -> Self {
        let pins = HEADER_PINS
            .iter()
            .map(|&(bcm, header)| (bcm, PinState::new(bcm, header)))
            .collect();

        Self::new(pins)
    }

    pub fn get(&self, pin: &u8) -> Result<&PinState, GpioError> {
        self.pins.get(pin).ok_or(GpioError::PinNotFound(*pin))
    }

    pub fn get_borrowed(&self) -> Vec<&PinState> {
        self.pins.values().filter(|x| x.leased).collect()
    }

    pub fn has_pin(&self, pin: u8) -> bool {
        self.pins.contains_key(&pin)
    }

    pub fn can_borrow_one(&self, pin: u8) -> bool {
        match self.pins.get(&pin) {
            Some(state) => !state.leased,
            None => false
        }
    }

    pub fn can_borrow_many(&self, pins: &[u8]) -> bool {
        pins.iter().all(|pin| self.can_borrow_one(*pin))
    }

    pub fn borrow_one(&mut self, pin: u8) -> Result<Uuid, GpioError> {
        self.borrow_many(vec![pin])
    }

    pub fn borrow_many(&mut self, pins: Vec<u8>) -> Result<Uuid, GpioError> {
        for pin in pins.iter() {
            match self.pins.get(pin) {
                Some(state) if state.leased => return Err(GpioError::Busy(*pin)),
                Some(_) => {},
                None => return Err(GpioError::PinNotFound(*pin))
            }
        }

        for pin in pins.iter() {
            if let Some(pin_state) = self.pins.get_mut(pin) {
                pin_state.leased = true;
            }
        }

        let uuid = Uuid::new_v4();
        self.leases.insert(uuid, pins);
        Ok(uuid)
    }
}
