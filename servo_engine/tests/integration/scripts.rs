//! Script expansion, recursion guard and append.

use servo_common::channel::ChannelId;
use servo_engine::CommandError;

use super::Rig;

#[test]
fn self_referencing_script_hits_recursion_limit() {
    let mut rig = Rig::new(&[0x40]);
    rig.engine.add_script("A", "loops forever", "script A").unwrap();
    rig.ok("script A");

    rig.tick_n(10);
    assert!(!rig.engine.sequence().is_active());
    // Top-level call plus four nested expansions.
    assert_eq!(rig.engine.sequence().len(), 5);
    assert!(matches!(
        rig.engine.last_step_result(),
        Some(Err(CommandError::RecursionLimit { limit: 5, .. }))
    ));
}

#[test]
fn mutually_recursive_scripts_terminate() {
    let mut rig = Rig::new(&[0x40]);
    rig.engine.add_script("ping", "", "script pong").unwrap();
    rig.engine.add_script("pong", "", "script ping").unwrap();
    rig.ok("script ping");

    rig.tick_n(20);
    assert!(rig.engine.is_idle());
    assert!(matches!(
        rig.engine.last_step_result(),
        Some(Err(CommandError::RecursionLimit { .. }))
    ));
}

#[test]
fn script_step_appends_to_running_sequence() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine
        .add_script("B", "", "servo 0 0 10; servo 0 0 20")
        .unwrap();
    rig.engine.start_command_sequence(["script B"]).unwrap();

    rig.engine.tick();
    assert!(rig.engine.sequence().len() >= 2);
    assert_eq!(rig.engine.sequence().len(), 3);

    rig.engine.tick();
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(10.0));
    rig.engine.tick();
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(20.0));

    rig.engine.tick();
    assert!(!rig.engine.sequence().is_active());
    assert_eq!(rig.monitor.write_count(0x40), 2);
}

#[test]
fn script_sleep_entries_are_resolved_by_the_runner() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.engine
        .add_script("wave", "", "servo 0 0 10\nsleep 500\nservo 0 0 90")
        .unwrap();
    assert_eq!(
        rig.engine.execute_command("script WAVE"),
        "Success: Executing script 'WAVE' (3 commands)"
    );

    rig.tick_at(0);
    rig.tick_at(0);
    rig.tick_at(499);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(10.0));
    rig.tick_at(500);
    assert_eq!(rig.engine.position(ChannelId::new(0, 0)), Some(90.0));
}

#[test]
fn script_by_index_and_crud() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 2);
    rig.engine.add_script("first", "", "servo 0 2 5").unwrap();
    rig.engine.add_script("second", "", "servo 0 2 95").unwrap();
    rig.engine.delete_script(0).unwrap();

    rig.engine.execute_script_at(0).unwrap();
    rig.engine.tick();
    assert_eq!(rig.engine.position(ChannelId::new(0, 2)), Some(95.0));
    assert!(rig.engine.execute_script_at(1).is_err());
}

#[test]
fn unknown_script_is_reported() {
    let mut rig = Rig::new(&[0x40]);
    assert_eq!(
        rig.engine.execute_command("script ghost"),
        "Error: Script 'ghost' not found"
    );
}
