//! Bus registry and simulation driver tests.

use servo_common::consts::PROBE_ADDRESSES;
use servo_common::driver::{BusSettings, DriverError};
use servo_hal::BusRegistry;

#[test]
fn builtin_registry_creates_simulation_bus() {
    let registry = BusRegistry::with_builtin();
    let settings = BusSettings {
        simulated_addresses: vec![0x41, 0x47],
    };
    let mut bus = registry.create_bus("simulation", &settings).unwrap();
    assert_eq!(bus.name(), "simulation");

    let boards = bus.discover(&PROBE_ADDRESSES).unwrap();
    let addresses: Vec<u8> = boards.iter().map(|b| b.address()).collect();
    assert_eq!(addresses, vec![0x41, 0x47]);
}

#[test]
fn unknown_driver_is_reported() {
    let registry = BusRegistry::with_builtin();
    let err = registry
        .create_bus("pca9685", &BusSettings::default())
        .err()
        .unwrap();
    assert_eq!(err, DriverError::DriverNotFound("pca9685".to_string()));
}

#[test]
fn rescan_hands_out_fresh_handles() {
    let registry = BusRegistry::with_builtin();
    let settings = BusSettings {
        simulated_addresses: vec![0x40],
    };
    let mut bus = registry.create_bus("simulation", &settings).unwrap();

    let mut first = bus.discover(&PROBE_ADDRESSES).unwrap();
    first[0].initialize(50).unwrap();
    drop(first);

    let mut second = bus.discover(&PROBE_ADDRESSES).unwrap();
    second[0].write_pulse_us(15, 2000).unwrap();
    assert!(matches!(
        second[0].write_pulse_us(16, 1500),
        Err(DriverError::InvalidChannel { channel: 16, .. })
    ));
}
