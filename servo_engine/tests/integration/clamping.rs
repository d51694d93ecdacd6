//! Position output always stays inside the configured range.

use proptest::prelude::*;
use servo_common::channel::ChannelId;
use servo_engine::command::ConfigField;
use servo_engine::mapper::percent_to_pulse_us;

use super::Rig;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_stays_within_center_plus_minus_range(
        center in 0.0f32..=100.0,
        range in 0.0f32..=50.0,
        requested in -50.0f32..=150.0,
    ) {
        let mut rig = Rig::new(&[0x40]);
        let id = ChannelId::new(0, 7);
        rig.engine.update_channel_config(id, ConfigField::Enabled, "true").unwrap();
        rig.engine.update_channel_config(id, ConfigField::Center, &center.to_string()).unwrap();
        rig.engine.update_channel_config(id, ConfigField::Range, &range.to_string()).unwrap();

        let out = rig.engine.set_channel_position(id, requested).unwrap();
        let min = (center - range).max(0.0);
        let max = (center + range).min(100.0);
        prop_assert!(out.position >= min && out.position <= max,
            "{} outside [{}, {}]", out.position, min, max);

        let pulse = rig.monitor.pulse_us(0x40, 7).unwrap();
        prop_assert_eq!(pulse, percent_to_pulse_us(out.position));
        prop_assert!((1000..=2000).contains(&pulse));
    }
}

#[test]
fn servo_command_is_clamped_to_narrow_range() {
    let mut rig = Rig::new(&[0x40]);
    rig.enable(0, 0);
    rig.ok("config 0 0 center 30");
    rig.ok("config 0 0 range 10");

    assert_eq!(rig.engine.execute_command("servo 0 0 0"), "Success: Moved servo 0:0 to 20%");
    assert_eq!(rig.engine.execute_command("servo 0 0 100"), "Success: Moved servo 0:0 to 40%");
    assert_eq!(rig.monitor.pulse_us(0x40, 0), Some(1400));
}
