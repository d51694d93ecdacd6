//! Sweep timing and completion.

use servo_common::channel::ChannelId;

use super::Rig;

#[test]
fn sweep_ends_exactly_on_target() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    let id = ChannelId::new(0, 0);
    rig.engine.start_sweep(id, 0.0, 100.0, 1000).unwrap();

    rig.tick_at(500);
    assert_eq!(rig.engine.position(id), Some(50.0));

    rig.tick_at(999);
    assert!(rig.engine.position(id).unwrap() < 100.0);

    rig.tick_at(1000);
    assert_eq!(rig.engine.position(id), Some(100.0));
    assert_eq!(rig.monitor.pulse_us(0x40, 0), Some(2000));
    assert_eq!(rig.engine.sweeps().active_count(), 0);
}

#[test]
fn late_tick_still_lands_on_end() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 3);
    rig.ok("sweep 0 3 80 20 300");

    rig.tick_at(5_000);
    assert_eq!(rig.engine.position(ChannelId::new(0, 3)), Some(20.0));
}

#[test]
fn stop_keeps_last_written_position() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.ok("sweep 0 0 0 100 1000");
    rig.tick_at(250);
    rig.ok("stop 0 0");

    rig.tick_at(1000);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(25.0));
}

#[test]
fn concurrent_sweeps_advance_independently() {
    let mut rig = Rig::new(&[0x40, 0x41]);
    rig.enable(0, 0);
    rig.enable(1, 15);
    rig.ok("sweep 0 0 0 100 1000");
    rig.ok("sweep 1 15 100 0 500");
    assert_eq!(rig.engine.sweeps().active_count(), 2);

    rig.tick_at(500);
    assert_eq!(rig.engine.position(ChannelId::new(1, 15)), Some(0.0));
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(50.0));
    assert_eq!(rig.engine.sweeps().active_count(), 1);
}

#[test]
fn restarting_replaces_running_sweep() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.ok("sweep 0 0 0 100 1000");
    rig.tick_at(400);
    rig.ok("sweep 0 0 100 0 100");
    assert_eq!(rig.engine.sweeps().active_count(), 1);

    rig.tick_at(500);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(0.0));
    assert!(rig.engine.is_idle());
}
