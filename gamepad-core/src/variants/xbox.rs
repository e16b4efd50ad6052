//! Xbox Wireless Controller (Bluetooth firmware).
//!
//! Input follows the report descriptor: 16-bit sticks, 10-bit triggers on
//! the Simulation page and a 1-based hat, all handled by the standard
//! decoder. Only the button numbering and the consumer buttons are specific.
//! Rumble goes out as report 0x03; there are no player LEDs.

use hid_proto::usage::{consumer, page};
use hid_proto::HidGlobals;

use crate::decode;
use crate::output::{Capabilities, OutputError, OutputSink, Rumble, HIDP_OUTPUT_HEADER};
use crate::types::{Buttons, GamepadState, MiscButtons};
use crate::variant::{Variant, VariantKind};

const REPORT_RUMBLE: u8 = 0x03;
/// Enable all four actuators: left/right impulse triggers, strong/weak motors.
const RUMBLE_ENABLE_ALL: u8 = 0x0F;
const RUMBLE_MAGNITUDE_MAX: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xbox;

fn magnitude(strength: u8) -> u8 {
    (u32::from(strength) * RUMBLE_MAGNITUDE_MAX / 255) as u8
}

impl Variant for Xbox {
    const KIND: VariantKind = VariantKind::Xbox;
    const CAPABILITIES: Capabilities = Capabilities {
        player_leds: false,
        rumble: true,
    };

    fn parse_usage(
        &mut self,
        state: &mut GamepadState,
        globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        let pressed = value != 0;
        match (usage_page, usage) {
            (page::BUTTON, 0x01) => state.buttons.set(Buttons::A, pressed),
            (page::BUTTON, 0x02) => state.buttons.set(Buttons::B, pressed),
            (page::BUTTON, 0x04) => state.buttons.set(Buttons::X, pressed),
            (page::BUTTON, 0x05) => state.buttons.set(Buttons::Y, pressed),
            (page::BUTTON, 0x07) => state.buttons.set(Buttons::LB, pressed),
            (page::BUTTON, 0x08) => state.buttons.set(Buttons::RB, pressed),
            // Older firmware reports View as a button, newer as AC Back
            (page::BUTTON, 0x0B) => state.misc_buttons.set(MiscButtons::SELECT, pressed),
            (page::BUTTON, 0x0C) => state.misc_buttons.set(MiscButtons::START, pressed),
            (page::BUTTON, 0x0D) => state.misc_buttons.set(MiscButtons::SYSTEM, pressed),
            (page::BUTTON, 0x0E) => state.buttons.set(Buttons::LS, pressed),
            (page::BUTTON, 0x0F) => state.buttons.set(Buttons::RS, pressed),
            (page::BUTTON, _) => {}
            (page::CONSUMER, consumer::AC_BACK) => {
                state.misc_buttons.set(MiscButtons::SELECT, pressed)
            }
            (page::CONSUMER, consumer::RECORD) => {
                state.misc_buttons.set(MiscButtons::CAPTURE, pressed)
            }
            _ => {
                decode::apply_standard_usage(state, globals, usage_page, usage, value);
            }
        }
    }

    fn set_rumble<S: OutputSink>(
        &mut self,
        rumble: Rumble,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        let duration = (rumble.duration_ms / 10).min(u16::from(u8::MAX)) as u8;
        let report = [
            HIDP_OUTPUT_HEADER,
            REPORT_RUMBLE,
            RUMBLE_ENABLE_ALL,
            0, // left trigger
            0, // right trigger
            magnitude(rumble.strong),
            magnitude(rumble.weak),
            duration,
            0, // start delay
            0, // loop count
        ];
        sink.send(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::RecordingSink;
    use crate::output::PlayerLeds;
    use crate::types::Dpad;
    use hid_proto::usage::{desktop, simulation};

    const STICK: HidGlobals = HidGlobals::new(page::GENERIC_DESKTOP, 0, 65535, 16, 4);
    const TRIGGER: HidGlobals = HidGlobals::new(page::SIMULATION, 0, 1023, 10, 1);
    const HAT: HidGlobals = HidGlobals::new(page::GENERIC_DESKTOP, 1, 8, 4, 1);
    const BUTTON: HidGlobals = HidGlobals::new(page::BUTTON, 0, 1, 1, 15);
    const CONSUMER: HidGlobals = HidGlobals::new(page::CONSUMER, 0, 1, 1, 1);

    #[test]
    fn test_usage_golden_vector() {
        let mut xbox = Xbox;
        let mut state = GamepadState::neutral();
        xbox.init_report(&mut state);

        let fields: &[(HidGlobals, u16, u16, i32)] = &[
            (STICK, page::GENERIC_DESKTOP, desktop::X, 0),
            (STICK, page::GENERIC_DESKTOP, desktop::Y, 65535),
            (STICK, page::GENERIC_DESKTOP, desktop::Z, 32768),
            (STICK, page::GENERIC_DESKTOP, desktop::RZ, 32768),
            (TRIGGER, page::SIMULATION, simulation::BRAKE, 1023),
            (TRIGGER, page::SIMULATION, simulation::ACCELERATOR, 0),
            (HAT, page::GENERIC_DESKTOP, desktop::HAT_SWITCH, 4),
            (BUTTON, page::BUTTON, 0x01, 1),
            (BUTTON, page::BUTTON, 0x03, 1),
            (BUTTON, page::BUTTON, 0x05, 1),
            (BUTTON, page::BUTTON, 0x0D, 1),
            (CONSUMER, page::CONSUMER, consumer::RECORD, 1),
        ];
        for &(globals, usage_page, usage, value) in fields {
            xbox.parse_usage(&mut state, &globals, usage_page, usage, value);
        }

        assert_eq!(state.left_stick.x, -32767);
        assert_eq!(state.left_stick.y, 32767);
        assert_eq!(state.right_stick.x, 0);
        assert_eq!(state.right_stick.y, 0);
        assert_eq!(state.left_trigger, 255);
        assert_eq!(state.right_trigger, 0);
        assert_eq!(state.dpad, Dpad::DOWN | Dpad::RIGHT);
        assert_eq!(state.buttons, Buttons::A | Buttons::Y);
        assert_eq!(state.misc_buttons, MiscButtons::SYSTEM | MiscButtons::CAPTURE);
    }

    #[test]
    fn test_hat_null_state() {
        let mut state = GamepadState::neutral();
        Xbox.parse_usage(&mut state, &HAT, page::GENERIC_DESKTOP, desktop::HAT_SWITCH, 0);
        assert_eq!(state.dpad, Dpad::NONE);
    }

    #[test]
    fn test_rumble_report() {
        let mut sink = RecordingSink::default();
        Xbox.set_rumble(Rumble::new(255, 128, 250), &mut sink).unwrap();
        assert_eq!(
            sink.reports[0],
            [HIDP_OUTPUT_HEADER, 0x03, 0x0F, 0, 0, 50, 100, 25, 0, 0]
        );
    }

    #[test]
    fn test_no_player_leds() {
        let mut sink = RecordingSink::default();
        Xbox.set_player_leds(PlayerLeds::player(1), &mut sink).unwrap();
        assert!(sink.reports.is_empty());
    }
}
