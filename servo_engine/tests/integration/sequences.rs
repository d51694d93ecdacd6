//! Sequence step waits.

use servo_common::channel::ChannelId;

use super::Rig;

#[test]
fn sweep_step_waits_duration_plus_settle() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.enable(0, 1);
    rig.engine
        .start_command_sequence(["sweep 0 0 0 100 2000", "servo 0 1 30", "servo 0 1 60"])
        .unwrap();

    rig.tick_at(0);
    assert_eq!(rig.engine.sweeps().active_count(), 1);

    rig.tick_at(2099);
    assert_eq!(rig.engine.position(ChannelId::new(0, 1)), None);

    rig.tick_at(2100);
    assert_eq!(rig.engine.position(ChannelId::new(0, 1)), Some(30.0));

    // A servo step imposes no wait.
    rig.engine.tick();
    assert_eq!(rig.engine.position(ChannelId::new(0, 1)), Some(60.0));

    rig.engine.tick();
    assert!(!rig.engine.sequence().is_active());
}

#[test]
fn sleep_step_waits_its_own_time() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine
        .start_command_sequence(["sleep 300", "servo 0 0 10"])
        .unwrap();

    rig.tick_at(0);
    rig.tick_at(299);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), None);
    rig.tick_at(300);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(10.0));
    assert!(rig.engine.queue().is_empty());
}

#[test]
fn failing_step_still_advances() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine
        .start_command_sequence(["servo 0 9 10", "bogus", "servo 0 0 10"])
        .unwrap();

    rig.tick_n(3);
    assert!(rig.engine.last_step_result().unwrap().is_ok());
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(10.0));
}

#[test]
fn new_sequence_replaces_running_one() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.ok("repeat 5 sweep 0 0 0 100 1000");
    rig.tick_at(0);

    rig.ok("repeat 2 servo 0 0 20");
    assert_eq!(rig.engine.sequence().len(), 2);
    assert_eq!(rig.engine.sequence().current_index(), 0);
}

#[test]
fn stop_sequence_halts_remaining_steps() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine
        .start_command_sequence(["servo 0 0 10", "sleep 100", "servo 0 0 90"])
        .unwrap();
    rig.tick_n(2);
    rig.ok("stop sequence");

    rig.tick_at(1000);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(10.0));
}

#[test]
fn rejected_sweep_step_still_waits() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine
        .start_command_sequence(["sweep 0 0 0 100 50", "sweep 9 0 0 100 400", "servo 0 0 10"])
        .unwrap();

    // Duration below the sweep minimum: rejected, but the wait stands.
    rig.tick_at(0);
    assert!(rig.engine.last_step_result().unwrap().is_err());
    assert_eq!(rig.engine.sequence().wait_until(), 150);

    rig.tick_at(1);
    assert_eq!(rig.engine.sequence().current_index(), 1);
    rig.tick_at(149);
    assert_eq!(rig.engine.sequence().current_index(), 1);

    // Board out of range.
    rig.tick_at(150);
    assert!(rig.engine.last_step_result().unwrap().is_err());
    assert_eq!(rig.engine.sequence().wait_until(), 650);

    rig.tick_at(649);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), None);
    rig.tick_at(650);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(10.0));
}
