//! Nintendo Switch Pro Controller.
//!
//! The controller starts in the simple HID mode (report 0x3F). Setup switches
//! it to the full mode (report 0x30) with 12-bit sticks, battery and motion.
//! Commands go out as report 0x01: a packet counter, a neutral rumble frame
//! and a subcommand.
//!
//! Buttons are mapped by position: Nintendo B (bottom) reports as `A`,
//! Nintendo A (right) as `B`, Y (left) as `X` and X (top) as `Y`.

use hid_proto::{scale, HidGlobals};

use super::{battery_from_steps, motion_axes, u16_le};
use crate::decode;
use crate::output::{Capabilities, OutputError, OutputSink, PlayerLeds, HIDP_OUTPUT_HEADER};
use crate::types::{Buttons, Dpad, GamepadState, MiscButtons, StatusFlags};
use crate::variant::{Variant, VariantKind};

const REPORT_FULL: u8 = 0x30;
const REPORT_SIMPLE: u8 = 0x3F;
const REPORT_SUBCOMMAND: u8 = 0x01;

const SUBCMD_SET_INPUT_MODE: u8 = 0x03;
const SUBCMD_SET_PLAYER_LEDS: u8 = 0x30;
const INPUT_MODE_FULL: u8 = 0x30;

/// Rumble frame that leaves both motors idle.
const RUMBLE_NEUTRAL: [u8; 8] = [0x00, 0x01, 0x40, 0x40, 0x00, 0x01, 0x40, 0x40];

const FULL_LEN: usize = 12;
const FULL_IMU_LEN: usize = 25;
const SIMPLE_LEN: usize = 12;

const STICK_MAX: i32 = 0x0FFF;
const BATTERY_STEPS: u8 = 4;

// Full report, right button byte.
const RIGHT_Y: u8 = 0x01;
const RIGHT_X: u8 = 0x02;
const RIGHT_B: u8 = 0x04;
const RIGHT_A: u8 = 0x08;
const RIGHT_R: u8 = 0x40;
const RIGHT_ZR: u8 = 0x80;

// Full report, shared button byte.
const SHARED_MINUS: u8 = 0x01;
const SHARED_PLUS: u8 = 0x02;
const SHARED_RS: u8 = 0x04;
const SHARED_LS: u8 = 0x08;
const SHARED_HOME: u8 = 0x10;
const SHARED_CAPTURE: u8 = 0x20;

// Full report, left button byte.
const LEFT_DOWN: u8 = 0x01;
const LEFT_UP: u8 = 0x02;
const LEFT_RIGHT: u8 = 0x04;
const LEFT_LEFT: u8 = 0x08;
const LEFT_L: u8 = 0x40;
const LEFT_ZL: u8 = 0x80;

// Simple report, first button byte.
const SIMPLE_B: u8 = 0x01;
const SIMPLE_A: u8 = 0x02;
const SIMPLE_Y: u8 = 0x04;
const SIMPLE_X: u8 = 0x08;
const SIMPLE_L: u8 = 0x10;
const SIMPLE_R: u8 = 0x20;
const SIMPLE_ZL: u8 = 0x40;
const SIMPLE_ZR: u8 = 0x80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Switch {
    /// 4-bit packet counter of the next command.
    counter: u8,
}

/// One packed 12-bit stick: X in the low 12 bits, Y in the high 12 bits.
fn stick(data: &[u8]) -> (i16, i16) {
    let x = i32::from(data[0]) | (i32::from(data[1] & 0x0F) << 8);
    let y = i32::from(data[1] >> 4) | (i32::from(data[2]) << 4);
    // Up is positive on the wire
    (
        scale::axis(x, 0, STICK_MAX),
        scale::axis(y, 0, STICK_MAX).saturating_neg(),
    )
}

fn trigger(pressed: bool) -> u8 {
    if pressed {
        u8::MAX
    } else {
        0
    }
}

impl Switch {
    fn send_subcommand<S: OutputSink>(
        &mut self,
        subcommand: u8,
        args: &[u8],
        sink: &mut S,
    ) -> Result<(), OutputError> {
        let mut report = [0u8; 16];
        report[0] = HIDP_OUTPUT_HEADER;
        report[1] = REPORT_SUBCOMMAND;
        report[2] = self.counter;
        self.counter = (self.counter + 1) & 0x0F;
        report[3..11].copy_from_slice(&RUMBLE_NEUTRAL);
        report[11] = subcommand;
        let len = 12 + args.len();
        let Some(dest) = report.get_mut(12..len) else {
            return Err(OutputError::TooLong);
        };
        dest.copy_from_slice(args);
        sink.send(&report[..len])
    }

    fn parse_full(report: &[u8], state: &mut GamepadState) -> bool {
        if report.len() < FULL_LEN {
            return false;
        }
        let (right, shared, left) = (report[3], report[4], report[5]);

        let mut buttons = Buttons::NONE;
        buttons.set(Buttons::A, right & RIGHT_B != 0);
        buttons.set(Buttons::B, right & RIGHT_A != 0);
        buttons.set(Buttons::X, right & RIGHT_Y != 0);
        buttons.set(Buttons::Y, right & RIGHT_X != 0);
        buttons.set(Buttons::RB, right & RIGHT_R != 0);
        buttons.set(Buttons::RT, right & RIGHT_ZR != 0);
        buttons.set(Buttons::LB, left & LEFT_L != 0);
        buttons.set(Buttons::LT, left & LEFT_ZL != 0);
        buttons.set(Buttons::LS, shared & SHARED_LS != 0);
        buttons.set(Buttons::RS, shared & SHARED_RS != 0);
        state.buttons = buttons;
        state.left_trigger = trigger(left & LEFT_ZL != 0);
        state.right_trigger = trigger(right & RIGHT_ZR != 0);

        let mut misc = MiscButtons::NONE;
        misc.set(MiscButtons::SELECT, shared & SHARED_MINUS != 0);
        misc.set(MiscButtons::START, shared & SHARED_PLUS != 0);
        misc.set(MiscButtons::SYSTEM, shared & SHARED_HOME != 0);
        misc.set(MiscButtons::CAPTURE, shared & SHARED_CAPTURE != 0);
        state.misc_buttons = misc;

        let mut dpad = Dpad::NONE;
        dpad.set(Dpad::UP, left & LEFT_UP != 0);
        dpad.set(Dpad::DOWN, left & LEFT_DOWN != 0);
        dpad.set(Dpad::LEFT, left & LEFT_LEFT != 0);
        dpad.set(Dpad::RIGHT, left & LEFT_RIGHT != 0);
        state.dpad = dpad;

        let (lx, ly) = stick(&report[6..9]);
        let (rx, ry) = stick(&report[9..12]);
        state.left_stick.x = lx;
        state.left_stick.y = ly;
        state.right_stick.x = rx;
        state.right_stick.y = ry;

        let battery = report[2] >> 4;
        state.battery = battery_from_steps(battery >> 1, BATTERY_STEPS);
        state.status.set(StatusFlags::CHARGING, battery & 0x01 != 0);

        if report.len() >= FULL_IMU_LEN {
            if let Some(accel) = motion_axes(report, 13) {
                state.accel = accel;
            }
            if let Some(gyro) = motion_axes(report, 19) {
                state.gyro = gyro;
            }
        }
        true
    }

    fn parse_simple(report: &[u8], state: &mut GamepadState) -> bool {
        if report.len() < SIMPLE_LEN {
            return false;
        }
        let (b0, b1) = (report[1], report[2]);

        let mut buttons = Buttons::NONE;
        buttons.set(Buttons::A, b0 & SIMPLE_B != 0);
        buttons.set(Buttons::B, b0 & SIMPLE_A != 0);
        buttons.set(Buttons::X, b0 & SIMPLE_Y != 0);
        buttons.set(Buttons::Y, b0 & SIMPLE_X != 0);
        buttons.set(Buttons::LB, b0 & SIMPLE_L != 0);
        buttons.set(Buttons::RB, b0 & SIMPLE_R != 0);
        buttons.set(Buttons::LT, b0 & SIMPLE_ZL != 0);
        buttons.set(Buttons::RT, b0 & SIMPLE_ZR != 0);
        buttons.set(Buttons::LS, b1 & SHARED_LS != 0);
        buttons.set(Buttons::RS, b1 & SHARED_RS != 0);
        state.buttons = buttons;
        state.left_trigger = trigger(b0 & SIMPLE_ZL != 0);
        state.right_trigger = trigger(b0 & SIMPLE_ZR != 0);

        // The second byte shares the full report's layout
        let mut misc = MiscButtons::NONE;
        misc.set(MiscButtons::SELECT, b1 & SHARED_MINUS != 0);
        misc.set(MiscButtons::START, b1 & SHARED_PLUS != 0);
        misc.set(MiscButtons::SYSTEM, b1 & SHARED_HOME != 0);
        misc.set(MiscButtons::CAPTURE, b1 & SHARED_CAPTURE != 0);
        state.misc_buttons = misc;

        state.dpad = Dpad::from_hat(Some(report[3]));

        let axis = |offset| {
            u16_le(report, offset).map_or(0, |v| scale::axis(i32::from(v), 0, 0xFFFF))
        };
        state.left_stick.x = axis(4);
        state.left_stick.y = axis(6);
        state.right_stick.x = axis(8);
        state.right_stick.y = axis(10);
        true
    }
}

impl Variant for Switch {
    const KIND: VariantKind = VariantKind::Switch;
    const CAPABILITIES: Capabilities = Capabilities {
        player_leds: true,
        rumble: false,
    };

    fn parse_usage(
        &mut self,
        state: &mut GamepadState,
        globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        decode::apply_standard_usage(state, globals, usage_page, usage, value);
    }

    fn parse_raw_report(&mut self, report: &[u8], state: &mut GamepadState) -> bool {
        match report.first() {
            Some(&REPORT_FULL) => Self::parse_full(report, state),
            Some(&REPORT_SIMPLE) => Self::parse_simple(report, state),
            _ => false,
        }
    }

    fn setup<S: OutputSink>(&mut self, sink: &mut S) -> Result<(), OutputError> {
        self.send_subcommand(SUBCMD_SET_INPUT_MODE, &[INPUT_MODE_FULL], sink)
    }

    fn set_player_leds<S: OutputSink>(
        &mut self,
        leds: PlayerLeds,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        self.send_subcommand(SUBCMD_SET_PLAYER_LEDS, &[leds.0 & 0x0F], sink)
    }
}
