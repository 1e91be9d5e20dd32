use std::time::Duration;

use crate::drivers::buzzer::Buzzer;
use crate::tests::fakes::{events, new_log, Event, FakeDelay, FakeLine};

#[test]
fn active_low_beep() {
    let log = new_log();
    let mut buzzer = Buzzer::new(FakeLine::new("BUZZER", &log), false, FakeDelay::new(&log));

    buzzer.buzz(Duration::from_millis(250)).unwrap();
    assert_eq!(events(&log), vec![
        Event::Low("BUZZER"),
        Event::Sleep(Duration::from_millis(250)),
        Event::High("BUZZER"),
    ]);
}

#[test]
fn active_high_beep() {
    let log = new_log();
    let mut buzzer = Buzzer::new(FakeLine::new("BUZZER", &log), true, FakeDelay::new(&log));

    buzzer.buzz(Duration::from_secs(1)).unwrap();
    assert_eq!(events(&log), vec![
        Event::High("BUZZER"),
        Event::Sleep(Duration::from_secs(1)),
        Event::Low("BUZZER"),
    ]);
}

#[test]
fn failed_line_never_sleeps() {
    let log = new_log();
    let mut buzzer = Buzzer::new(FakeLine::failing("BUZZER", &log), false, FakeDelay::new(&log));

    assert!(buzzer.buzz(Duration::from_millis(100)).is_err());
    assert!(events(&log).is_empty());
}
