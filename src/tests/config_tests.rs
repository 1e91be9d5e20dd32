use crate::config::{ConfigError, Configuration, PwmOutputConfig};
use crate::errors::HalError;
use crate::registry::RegistryError;

#[test]
fn default_is_reference_wiring() {
    let config = Configuration::default();
    assert_eq!(config.validate(), Ok(()));

    let motors = &config.motor_section;
    assert_eq!(motors.standby_pin, 18);
    assert_eq!((motors.motor_a.in1_pin, motors.motor_a.in2_pin, motors.motor_a.pwm.pin()), (27, 23, 22));
    assert_eq!((motors.motor_b.in1_pin, motors.motor_b.in2_pin, motors.motor_b.pwm.pin()), (17, 15, 14));
    assert_eq!(config.buzzer_section.pin, 13);
    assert!(!config.buzzer_section.active_high);
    assert_eq!(config.led_section.pins, vec![5, 6]);
    assert_eq!(config.sensor_section.bus_id, 1);
    assert_eq!(config.sensor_section.mux_address, 0x70);
    assert_eq!(config.sensor_section.mux_register, 0x04);
    assert_eq!(config.sensor_section.ground_threshold, 200);
}

#[test]
fn json_round_trip() {
    let config = Configuration::default();
    let json = config.to_str(true).unwrap();

    assert_eq!(Configuration::from_str(&json), Ok(config));
}

#[test]
fn to_writer_matches_to_str() {
    let config = Configuration::default();
    let mut buffer = Vec::new();
    config.to_writer(&mut buffer, false).unwrap();

    assert_eq!(String::from_utf8(buffer).unwrap(), config.to_str(false).unwrap());
}

#[test]
fn missing_sections_use_defaults() {
    let config = Configuration::from_str(r#"{ "led_section": { "pins": [5] } }"#).unwrap();

    assert_eq!(config.led_section.pins, vec![5]);
    assert_eq!(config.motor_section, Configuration::default().motor_section);
    assert_eq!(config.sensor_section, Configuration::default().sensor_section);
}

#[test]
fn hardware_pwm_entry() {
    let json = r#"{
        "motor_section": {
            "standby_pin": 18,
            "motor_a": { "in1_pin": 27, "in2_pin": 23, "pwm": { "kind": "hardware", "channel": 0, "pin": 12, "frequency": 1000.0 } },
            "motor_b": { "in1_pin": 17, "in2_pin": 15, "pwm": { "kind": "software", "pin": 14, "frequency": 100.0 } }
        }
    }"#;
    let config = Configuration::from_str(json).unwrap();

    assert_eq!(
        config.motor_section.motor_a.pwm,
        PwmOutputConfig::Hardware { channel: 0, pin: 12, frequency: 1000.0 }
    );
}

#[test]
fn shared_pin_is_rejected() {
    let mut config = Configuration::default();
    config.led_section.pins = vec![5, 27];

    match config.validate() {
        Err(ConfigError::DuplicateEntry(msg)) => assert!(msg.contains("AIN1") && msg.contains("LED2"), "{}", msg),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn non_header_pin_is_rejected() {
    let mut config = Configuration::default();
    config.buzzer_section.pin = 30;

    assert!(matches!(config.validate(), Err(ConfigError::InvalidEntry(_))));
}

#[test]
fn bad_pwm_settings_are_rejected() {
    let mut config = Configuration::default();
    config.motor_section.motor_a.pwm = PwmOutputConfig::Software { pin: 22, frequency: 0.0 };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidEntry(_))));

    let mut config = Configuration::default();
    config.motor_section.motor_b.pwm = PwmOutputConfig::Hardware { channel: 2, pin: 14, frequency: 100.0 };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidEntry(_))));

    let mut config = Configuration::default();
    config.motor_section.motor_a.pwm = PwmOutputConfig::Hardware { channel: 1, pin: 12, frequency: 100.0 };
    config.motor_section.motor_b.pwm = PwmOutputConfig::Hardware { channel: 1, pin: 19, frequency: 100.0 };
    assert!(matches!(config.validate(), Err(ConfigError::DuplicateEntry(_))));
}

#[test]
fn bad_i2c_settings_are_rejected() {
    let mut config = Configuration::default();
    config.sensor_section.mux_address = 0x80;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidEntry(_))));

    let mut config = Configuration::default();
    config.sensor_section.mux_address = 0x39;
    assert!(matches!(config.validate(), Err(ConfigError::DuplicateEntry(_))));
}

#[test]
fn malformed_json_is_a_serialize_error() {
    assert!(matches!(Configuration::from_str("{ not json"), Err(ConfigError::SerializeError(_))));
    assert!(matches!(
        Configuration::from_str(r#"{ "buzzer_section": { "pin": "thirteen", "active_high": false } }"#),
        Err(ConfigError::SerializeError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        Configuration::load("/nonexistent/rover_hal/config.json"),
        Err(ConfigError::IoError(_))
    ));
}

#[test]
fn hal_errors_name_their_kind() {
    let config = HalError::from(ConfigError::InvalidEntry("no pins".to_string()));
    assert_eq!(config.to_string(), "config error: invalid config entry: no pins");

    let registry = HalError::from(RegistryError::MissingController("I2C".to_string()));
    assert_eq!(registry.to_string(), "registry error: bus controller \"I2C\" was unavailable");
}
