//! Inverse pair propagation.

use servo_common::channel::ChannelId;

use super::Rig;

#[test]
fn master_offset_is_mirrored_around_slave_center() {
    let mut rig = Rig::new(&[0x40, 0x41]);
    rig.enable(0, 0);
    rig.enable(1, 0);
    rig.ok("pair 0 0 1 0");

    rig.ok("servo 0 0 80");
    assert_eq!(rig.engine.position(ChannelId::new(1, 0)), Some(20.0));
    assert_eq!(rig.monitor.pulse_us(0x41, 0), Some(1200));
}

#[test]
fn mirrored_position_is_clamped_to_slave_range() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.enable(0, 1);
    rig.ok("config 0 1 center 60");
    rig.ok("config 0 1 range 10");
    rig.ok("pair 0 0 0 1");

    // 60 - (80 - 50) = 30, clamped to [50, 70]
    rig.ok("servo 0 0 80");
    assert_eq!(rig.engine.position(ChannelId::new(0, 1)), Some(50.0));
}

#[test]
fn slave_write_does_not_move_master() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.enable(0, 1);
    rig.ok("pair 0 0 0 1");
    rig.ok("servo 0 0 50");

    rig.ok("servo 0 1 90");
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(50.0));
}

#[test]
fn master_write_stands_when_slave_is_disabled() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.ok("pair 0 0 0 1");

    assert_eq!(rig.engine.execute_command("servo 0 0 70"), "Success: Moved servo 0:0 to 70%");
    assert_eq!(rig.engine.position(ChannelId::new(0, 1)), None);
}

#[test]
fn sweeping_a_master_drags_the_slave() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.enable(0, 1);
    rig.ok("pair 0 0 0 1");
    rig.ok("sweep 0 0 50 100 1000");

    rig.tick_at(1000);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(100.0));
    assert_eq!(rig.engine.position(ChannelId::new(0, 1)), Some(0.0));
}
