use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use strum::IntoEnumIterator;

use crate::bus::TransportError;
use crate::errors::HalError;
use crate::mux::{Multiplexer, SensorChannel, CHANNEL_SELECT_REGISTER, DEFAULT_MUX_ADDRESS};

#[test]
fn channel_masks() {
    let expected = [
        ("GU2", 0x01),
        ("GU3", 0x02),
        ("GU4", 0x04),
        ("GU5", 0x08),
        ("FU1", 0x10),
        ("FU2", 0x20),
        ("FU4", 0x40),
    ];

    let table: Vec<(String, u8)> = SensorChannel::iter().map(|c| (c.to_string(), c.mask())).collect();
    let expected: Vec<(String, u8)> = expected.iter().map(|(n, m)| (n.to_string(), *m)).collect();
    assert_eq!(table, expected);
}

#[test]
fn masks_are_distinct_single_bits() {
    let mut seen = 0u8;
    for channel in SensorChannel::iter() {
        let mask = channel.mask();
        assert_eq!(mask.count_ones(), 1);
        assert!(mask < 0x80);
        assert_eq!(seen & mask, 0);
        seen |= mask;
    }
}

#[test]
fn select_writes_once() {
    let expectations = [
        I2cTransaction::write(DEFAULT_MUX_ADDRESS, vec![CHANNEL_SELECT_REGISTER, 0x08]),
    ];
    let mut bus = I2cMock::new(&expectations);
    let mux = Multiplexer::default();

    assert_eq!(mux.select(&mut bus, "GU5"), Ok(SensorChannel::Gu5));
    bus.done();
}

#[test]
fn select_by_enum_and_lowercase_name() {
    let expectations = [
        I2cTransaction::write(0x71, vec![0x04, 0x40]),
        I2cTransaction::write(0x71, vec![0x04, 0x20]),
    ];
    let mut bus = I2cMock::new(&expectations);
    let mux = Multiplexer::new(0x71, 0x04);

    mux.select(&mut bus, SensorChannel::Fu4).unwrap();
    mux.select(&mut bus, "fu2").unwrap();
    bus.done();
}

#[test]
fn unknown_channel_issues_no_transaction() {
    let expectations: [I2cTransaction; 0] = [];
    let mut bus = I2cMock::new(&expectations);
    let mux = Multiplexer::default();

    assert!(mux.select(&mut bus, "FU3").unwrap_err().is_invalid_argument());
    assert!(mux.select(&mut bus, "GU1").unwrap_err().is_invalid_argument());
    assert!(mux.select(&mut bus, "").unwrap_err().is_invalid_argument());
    bus.done();
}

#[test]
fn bus_failure_propagates_unchanged() {
    let expectations = [
        I2cTransaction::write(DEFAULT_MUX_ADDRESS, vec![CHANNEL_SELECT_REGISTER, 0x01]).with_error(ErrorKind::Other),
    ];
    let mut bus = I2cMock::new(&expectations);
    let mux = Multiplexer::default();

    assert_eq!(
        mux.select(&mut bus, SensorChannel::Gu2),
        Err(HalError::Transport(TransportError::bus(ErrorKind::Other)))
    );
    bus.done();
}
