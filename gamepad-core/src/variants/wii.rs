//! Nintendo Wii Remote, held upright.
//!
//! Only the core buttons (report 0x30) and buttons plus accelerometer
//! (report 0x31) are decoded; setup selects 0x31. The status report 0x20
//! carries the battery level. Every output report's first byte holds the
//! rumble bit in bit 0, so the current rumble state rides along with LEDs.

use hid_proto::HidGlobals;

use super::battery_from_steps;
use crate::output::{Capabilities, OutputError, OutputSink, PlayerLeds, Rumble, HIDP_OUTPUT_HEADER};
use crate::types::{Buttons, Dpad, GamepadState, MiscButtons};
use crate::variant::{Variant, VariantKind};

const REPORT_STATUS: u8 = 0x20;
const REPORT_CORE: u8 = 0x30;
const REPORT_CORE_ACCEL: u8 = 0x31;

const OUT_RUMBLE: u8 = 0x10;
const OUT_LEDS: u8 = 0x11;
const OUT_REPORT_MODE: u8 = 0x12;

const STATUS_BATTERY: usize = 6;
const ACCEL_CENTER: i32 = 0x200;

// First core button byte.
const LEFT: u8 = 0x01;
const RIGHT: u8 = 0x02;
const DOWN: u8 = 0x04;
const UP: u8 = 0x08;
const PLUS: u8 = 0x10;

// Second core button byte.
const TWO: u8 = 0x01;
const ONE: u8 = 0x02;
const B: u8 = 0x04;
const A: u8 = 0x08;
const MINUS: u8 = 0x10;
const HOME: u8 = 0x80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wii {
    leds: u8,
    rumble: bool,
}

impl Wii {
    fn rumble_bit(&self) -> u8 {
        u8::from(self.rumble)
    }

    fn apply_core_buttons(state: &mut GamepadState, b0: u8, b1: u8) {
        let mut dpad = Dpad::NONE;
        dpad.set(Dpad::LEFT, b0 & LEFT != 0);
        dpad.set(Dpad::RIGHT, b0 & RIGHT != 0);
        dpad.set(Dpad::DOWN, b0 & DOWN != 0);
        dpad.set(Dpad::UP, b0 & UP != 0);
        state.dpad = dpad;

        let mut buttons = Buttons::NONE;
        buttons.set(Buttons::A, b1 & A != 0);
        buttons.set(Buttons::B, b1 & B != 0);
        buttons.set(Buttons::X, b1 & ONE != 0);
        buttons.set(Buttons::Y, b1 & TWO != 0);
        state.buttons = buttons;

        let mut misc = MiscButtons::NONE;
        misc.set(MiscButtons::START, b0 & PLUS != 0);
        misc.set(MiscButtons::SELECT, b1 & MINUS != 0);
        misc.set(MiscButtons::SYSTEM, b1 & HOME != 0);
        state.misc_buttons = misc;
    }

    /// 10-bit accelerometer: high bits in the accel bytes, low bits spread
    /// over the unused bits of the button bytes.
    fn accel(b0: u8, b1: u8, xyz: &[u8]) -> [i32; 3] {
        let x = (i32::from(xyz[0]) << 2) | i32::from((b0 >> 5) & 0x03);
        let y = (i32::from(xyz[1]) << 2) | (i32::from((b1 >> 5) & 0x01) << 1);
        let z = (i32::from(xyz[2]) << 2) | (i32::from((b1 >> 6) & 0x01) << 1);
        [x - ACCEL_CENTER, y - ACCEL_CENTER, z - ACCEL_CENTER]
    }
}

impl Variant for Wii {
    const KIND: VariantKind = VariantKind::Wii;
    const CAPABILITIES: Capabilities = Capabilities {
        player_leds: true,
        rumble: true,
    };

    fn parse_usage(
        &mut self,
        _state: &mut GamepadState,
        _globals: &HidGlobals,
        _usage_page: u16,
        _usage: u16,
        _value: i32,
    ) {
        // The descriptor only lists vendor-defined reports
    }

    fn parse_raw_report(&mut self, report: &[u8], state: &mut GamepadState) -> bool {
        match *report {
            [REPORT_CORE, b0, b1, ..] => {
                Self::apply_core_buttons(state, b0, b1);
                true
            }
            [REPORT_CORE_ACCEL, b0, b1, ref rest @ ..] if rest.len() >= 3 => {
                Self::apply_core_buttons(state, b0, b1);
                state.accel = Self::accel(b0, b1, rest);
                true
            }
            [REPORT_STATUS, b0, b1, ..] => {
                Self::apply_core_buttons(state, b0, b1);
                if let Some(&level) = report.get(STATUS_BATTERY) {
                    state.battery = battery_from_steps(level, u8::MAX);
                }
                true
            }
            _ => false,
        }
    }

    fn setup<S: OutputSink>(&mut self, sink: &mut S) -> Result<(), OutputError> {
        sink.send(&[
            HIDP_OUTPUT_HEADER,
            OUT_REPORT_MODE,
            self.rumble_bit(),
            REPORT_CORE_ACCEL,
        ])
    }

    fn set_player_leds<S: OutputSink>(
        &mut self,
        leds: PlayerLeds,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        self.leds = leds.0 & 0x0F;
        sink.send(&[
            HIDP_OUTPUT_HEADER,
            OUT_LEDS,
            (self.leds << 4) | self.rumble_bit(),
        ])
    }

    /// On/off only: any non-zero strength turns the motor on.
    fn set_rumble<S: OutputSink>(
        &mut self,
        rumble: Rumble,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        self.rumble = !rumble.is_off();
        sink.send(&[HIDP_OUTPUT_HEADER, OUT_RUMBLE, self.rumble_bit()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::RecordingSink;
    use crate::types::BATTERY_FULL;

    #[test]
    fn test_core_accel_golden_vector() {
        let report = [REPORT_CORE_ACCEL, UP | PLUS | 0x60, A | HOME, 0x80, 0x80, 0x99];
        let mut wii = Wii::default();
        let mut state = GamepadState::neutral();
        wii.init_report(&mut state);

        assert!(wii.parse_raw_report(&report, &mut state));
        assert_eq!(state.dpad, Dpad::UP);
        assert_eq!(state.buttons, Buttons::A);
        assert_eq!(state.misc_buttons, MiscButtons::START | MiscButtons::SYSTEM);
        // x picks up both low bits from the first button byte
        assert_eq!(state.accel, [3, 0, 0x99 * 4 - 0x200]);
    }

    #[test]
    fn test_core_buttons_report() {
        let mut state = GamepadState::neutral();
        assert!(Wii::default().parse_raw_report(&[REPORT_CORE, LEFT, B | MINUS], &mut state));
        assert_eq!(state.dpad, Dpad::LEFT);
        assert_eq!(state.buttons, Buttons::B);
        assert_eq!(state.misc_buttons, MiscButtons::SELECT);
    }

    #[test]
    fn test_status_report_battery() {
        let mut state = GamepadState::neutral();
        let report = [REPORT_STATUS, 0, 0, 0x10, 0, 0, 0xFF];
        assert!(Wii::default().parse_raw_report(&report, &mut state));
        assert_eq!(state.battery, BATTERY_FULL);
    }

    #[test]
    fn test_unknown_and_short_reports() {
        let mut state = GamepadState::neutral();
        assert!(!Wii::default().parse_raw_report(&[REPORT_CORE_ACCEL, 0, 0, 1], &mut state));
        assert!(!Wii::default().parse_raw_report(&[0x3D, 1, 2, 3], &mut state));
        assert!(!Wii::default().parse_raw_report(&[REPORT_CORE], &mut state));
        assert_eq!(state, GamepadState::neutral());
    }

    #[test]
    fn test_output_reports_carry_rumble_bit() {
        let mut wii = Wii::default();
        let mut sink = RecordingSink::default();
        wii.setup(&mut sink).unwrap();
        wii.set_rumble(Rumble::new(0, 10, 0), &mut sink).unwrap();
        wii.set_player_leds(PlayerLeds::player(2), &mut sink).unwrap();
        wii.set_rumble(Rumble::OFF, &mut sink).unwrap();

        assert_eq!(sink.reports[0], [HIDP_OUTPUT_HEADER, 0x12, 0x00, 0x31]);
        assert_eq!(sink.reports[1], [HIDP_OUTPUT_HEADER, 0x10, 0x01]);
        assert_eq!(sink.reports[2], [HIDP_OUTPUT_HEADER, 0x11, 0x21]);
        assert_eq!(sink.reports[3], [HIDP_OUTPUT_HEADER, 0x10, 0x00]);
    }
}
