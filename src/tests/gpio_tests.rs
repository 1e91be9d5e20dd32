use crate::gpio::{GpioBorrowChecker, GpioError, PinState};
use std::collections::HashMap;

fn checker() -> GpioBorrowChecker {
    let mut pin_map = HashMap::new();
    pin_map.insert(2, PinState::new(2, 3));
    pin_map.insert(3, PinState::new(3, 5));
    pin_map.insert(4, PinState::new(4, 7));
    pin_map.insert(5, PinState::new(5, 29));
    pin_map.insert(6, PinState::new(6, 31));
    GpioBorrowChecker::new(pin_map)
}

#[test]
fn has_pin_test() {
    let gpio = checker();

    // non-existent pins
    assert!(!gpio.has_pin(1));
    assert!(!gpio.has_pin(16));

    // test multiple times
    assert!(gpio.has_pin(2));
    assert!(gpio.has_pin(2));

    // test existing pins
    assert!(gpio.has_pin(3));
    assert!(gpio.has_pin(6));
}

#[test]
fn raspberry_pi_header() {
    let gpio = GpioBorrowChecker::raspberry_pi();

    for bcm in 0..=27 {
        assert!(gpio.has_pin(bcm), "BCM {} missing", bcm);
    }
    assert!(!gpio.has_pin(28));
    assert_eq!(gpio.get(&2).map(|p| p.header_pin()), Ok(3));
    assert_eq!(gpio.get(&18).map(|p| p.header_pin()), Ok(12));
    assert_eq!(gpio.get(&27).map(|p| p.header_pin()), Ok(13));
    assert!(matches!(gpio.get(&40), Err(GpioError::PinNotFound(40))));
}

#[test]
fn borrow_many() {
    let mut gpio = checker();

    assert!(gpio.borrow_many(vec![2, 3]).is_ok());
    assert!(gpio.borrow_many(vec![4, 5]).is_ok());
    assert!(gpio.borrow_many(vec![6]).is_ok());
}

#[test]
fn notfound_borrow_many() {
    let mut gpio = checker();

    assert_eq!(
        gpio.borrow_many(vec![3, 4, 7]),
        Err(GpioError::PinNotFound(7))
    );
    assert_eq!(gpio.borrow_many(vec![2, 1]), Err(GpioError::PinNotFound(1)));

    // failed borrows lease nothing
    assert!(gpio.get_borrowed().is_empty());
}

#[test]
fn busy_borrow_many() {
    let mut gpio = checker();

    assert!(gpio.borrow_many(vec![2, 3, 4, 6]).is_ok());
    assert_eq!(gpio.borrow_many(vec![3, 5]), Err(GpioError::Busy(3)));
    assert!(gpio.can_borrow_one(5));
    assert!(!gpio.can_borrow_many(&[5, 6]));
}

#[test]
fn borrow_one() {
    let mut gpio = checker();

    assert!(gpio.borrow_one(2).is_ok());
    assert!(gpio.get(&2).unwrap().is_leased());
    assert_eq!(gpio.get_borrowed().len(), 1);
}

#[test]
fn notfound_borrow_one() {
    let mut gpio = checker();

    assert_eq!(gpio.borrow_one(1), Err(GpioError::PinNotFound(1)));
    assert!(!gpio.can_borrow_one(1));
}

#[test]
fn busy_borrow_one() {
    let mut gpio = checker();

    assert!(gpio.borrow_one(2).is_ok());
    assert_eq!(gpio.borrow_one(2), Err(GpioError::Busy(2)));
}

#[test]
fn leases_are_unique() {
    let mut gpio = checker();

    let first = gpio.borrow_one(2).unwrap();
    let second = gpio.borrow_one(3).unwrap();
    assert_ne!(first, second);
}
