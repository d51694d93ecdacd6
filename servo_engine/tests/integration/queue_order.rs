//! Timed Queue ordering.

use servo_common::channel::ChannelId;

use super::Rig;

#[test]
fn earlier_submission_blocks_later_due_entry() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine.queue_command("servo 0 0 10", 500).unwrap();
    rig.engine.queue_command("servo 0 0 90", 10).unwrap();

    rig.tick_at(20);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), None);
    assert_eq!(rig.engine.queue().len(), 2);

    rig.tick_at(500);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(90.0));
    assert_eq!(rig.monitor.write_count(0x40), 2);
    assert!(rig.engine.queue().is_empty());
}

#[test]
fn top_level_sleep_delays_queued_commands_behind_it() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.ok("sleep 200");
    rig.engine.queue_command("servo 0 0 30", 0).unwrap();

    rig.tick_at(199);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), None);
    rig.tick_at(200);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(30.0));
}

#[test]
fn stop_queue_drops_pending_entries() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine.queue_command("servo 0 0 30", 100).unwrap();
    assert_eq!(rig.ok("stop queue"), "Success: Cleared 1 queued command(s)");

    rig.tick_at(100);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), None);
}

#[test]
fn queued_repeat_starts_a_sequence() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine.queue_command("repeat 2 servo 0 0 40", 10).unwrap();

    rig.tick_at(10);
    assert!(rig.engine.sequence().is_active());
    assert_eq!(rig.engine.sequence().len(), 2);
}
