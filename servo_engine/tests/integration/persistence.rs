//! Live and offline configuration slots on disk.

use servo_common::channel::ChannelId;
use servo_engine::store::{ConfigSlot, JsonFileStore};
use tempfile::tempdir;

use super::Rig;

#[test]
fn live_slot_is_applied_on_startup() {
    let dir = tempdir().unwrap();
    {
        let mut rig = Rig::with_store(&[0x40], Box::new(JsonFileStore::new(dir.path())));
        rig.enable(0, 4);
        rig.ok("config 0 4 initPosition 80");
        rig.ok("config 0 4 name Jaw");
        rig.engine.add_script("chomp", "open and close", "servo 0 4 20; servo 0 4 80").unwrap();
        rig.ok("system save");
    }

    let json = std::fs::read_to_string(dir.path().join("servo_config.json")).unwrap();
    assert!(json.contains("\"initPosition\": 80.0"));
    assert!(json.contains("\"chomp\""));

    let rig = Rig::with_store(&[0x40], Box::new(JsonFileStore::new(dir.path())));
    let id = ChannelId::new(0, 4);
    assert_eq!(rig.engine.channel(id).unwrap().name, "Jaw");
    assert_eq!(rig.engine.position(id), Some(80.0));
    assert_eq!(rig.monitor.pulse_us(0x40, 4), Some(1800));
    assert!(rig.engine.scripts().find("chomp").is_some());
}

#[test]
fn offline_slot_is_independent() {
    let dir = tempdir().unwrap();
    let mut rig = Rig::with_store(&[0x40], Box::new(JsonFileStore::new(dir.path())));
    rig.enable(0, 0);
    rig.ok("system save-offline");
    rig.ok("config 0 0 enabled false");

    assert!(!dir.path().join("servo_config.json").exists());
    rig.ok("system load-offline");
    assert!(rig.engine.channel(ChannelId::new(0, 0)).unwrap().enabled);
}

#[test]
fn stored_board_at_other_address_is_skipped() {
    let dir = tempdir().unwrap();
    {
        let mut rig = Rig::with_store(&[0x40], Box::new(JsonFileStore::new(dir.path())));
        rig.enable(0, 0);
        rig.ok("system save");
    }

    let rig = Rig::with_store(&[0x41], Box::new(JsonFileStore::new(dir.path())));
    assert!(!rig.engine.channel(ChannelId::new(0, 0)).unwrap().enabled);
    assert_eq!(rig.engine.servo_array().board(0).unwrap().name, "PCA9685 @0x41");
}

#[test]
fn pairing_survives_a_round_trip() {
    let dir = tempdir().unwrap();
    let mut rig = Rig::with_store(&[0x40], Box::new(JsonFileStore::new(dir.path())));
    rig.ok("pair 0 0 0 1");
    rig.engine.save_configuration(ConfigSlot::Live).unwrap();
    rig.ok("pair 0 1 0 0");
    rig.engine.load_configuration(ConfigSlot::Live).unwrap();

    let master = rig.engine.channel(ChannelId::new(0, 0)).unwrap();
    assert!(master.is_pair_master);
    assert_eq!(master.pair, Some(ChannelId::new(0, 1)));
    assert!(!rig.engine.channel(ChannelId::new(0, 1)).unwrap().is_pair_master);
}
