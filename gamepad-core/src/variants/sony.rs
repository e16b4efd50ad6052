//! Pieces shared by the DualShock 4 and DualSense decoders.

use hid_proto::scale;
use hid_proto::usage::page;
use hid_proto::{Crc32Digest, HidGlobals};

use crate::decode;
use crate::output::{PlayerLeds, HIDP_OUTPUT_HEADER};
use crate::types::{Buttons, Dpad, GamepadState, MiscButtons};

/// Length of a Bluetooth output report, HIDP header and CRC included.
pub(crate) const BT_OUTPUT_LEN: usize = 79;

const CRC_OFFSET: usize = BT_OUTPUT_LEN - 4;

// First button byte, above the hat nibble.
const SQUARE: u8 = 0x10;
const CROSS: u8 = 0x20;
const CIRCLE: u8 = 0x40;
const TRIANGLE: u8 = 0x80;

// Second button byte.
const L1: u8 = 0x01;
const R1: u8 = 0x02;
const L2: u8 = 0x04;
const R2: u8 = 0x08;
const SHARE: u8 = 0x10;
const OPTIONS: u8 = 0x20;
const L3: u8 = 0x40;
const R3: u8 = 0x80;

// Third button byte.
const PS: u8 = 0x01;
const TOUCHPAD: u8 = 0x02;

/// Left and right stick from four unsigned bytes (lx, ly, rx, ry).
pub(crate) fn apply_sticks(state: &mut GamepadState, axes: &[u8]) {
    let axis = |i: usize| axes.get(i).map_or(0, |&v| scale::axis(i32::from(v), 0, 255));
    state.left_stick.x = axis(0);
    state.left_stick.y = axis(1);
    state.right_stick.x = axis(2);
    state.right_stick.y = axis(3);
}

/// The three button bytes common to both controllers.
pub(crate) fn apply_buttons(state: &mut GamepadState, b0: u8, b1: u8, b2: u8) {
    state.dpad = Dpad::from_hat(Some(b0 & 0x0F));

    let mut buttons = Buttons::NONE;
    buttons.set(Buttons::A, b0 & CROSS != 0);
    buttons.set(Buttons::B, b0 & CIRCLE != 0);
    buttons.set(Buttons::X, b0 & SQUARE != 0);
    buttons.set(Buttons::Y, b0 & TRIANGLE != 0);
    buttons.set(Buttons::LB, b1 & L1 != 0);
    buttons.set(Buttons::RB, b1 & R1 != 0);
    buttons.set(Buttons::LT, b1 & L2 != 0);
    buttons.set(Buttons::RT, b1 & R2 != 0);
    buttons.set(Buttons::LS, b1 & L3 != 0);
    buttons.set(Buttons::RS, b1 & R3 != 0);
    state.buttons = buttons;

    let mut misc = MiscButtons::NONE;
    misc.set(MiscButtons::SELECT, b1 & SHARE != 0);
    misc.set(MiscButtons::START, b1 & OPTIONS != 0);
    misc.set(MiscButtons::SYSTEM, b2 & PS != 0);
    misc.set(MiscButtons::CAPTURE, b2 & TOUCHPAD != 0);
    state.misc_buttons = misc;
}

/// Descriptor-driven fallback for the simple report both controllers send
/// before their full mode is enabled. Buttons are numbered square, cross,
/// circle, triangle, L1, R1, L2, R2, share, options, L3, R3, PS, touchpad.
pub(crate) fn parse_usage(
    state: &mut GamepadState,
    globals: &HidGlobals,
    usage_page: u16,
    usage: u16,
    value: i32,
) {
    if usage_page != page::BUTTON {
        decode::apply_standard_usage(state, globals, usage_page, usage, value);
        return;
    }
    let pressed = value != 0;
    match usage {
        1 => state.buttons.set(Buttons::X, pressed),
        2 => state.buttons.set(Buttons::A, pressed),
        3 => state.buttons.set(Buttons::B, pressed),
        4 => state.buttons.set(Buttons::Y, pressed),
        5 => state.buttons.set(Buttons::LB, pressed),
        6 => state.buttons.set(Buttons::RB, pressed),
        7 => state.buttons.set(Buttons::LT, pressed),
        8 => state.buttons.set(Buttons::RT, pressed),
        9 => state.misc_buttons.set(MiscButtons::SELECT, pressed),
        10 => state.misc_buttons.set(MiscButtons::START, pressed),
        11 => state.buttons.set(Buttons::LS, pressed),
        12 => state.buttons.set(Buttons::RS, pressed),
        13 => state.misc_buttons.set(MiscButtons::SYSTEM, pressed),
        14 => state.misc_buttons.set(MiscButtons::CAPTURE, pressed),
        _ => {}
    }
}

/// Lightbar color identifying a player: blue, red, green, pink.
pub(crate) fn lightbar_color(leds: PlayerLeds) -> [u8; 3] {
    match leds.first_player() {
        Some(1) => [0x00, 0x00, 0x40],
        Some(2) => [0x40, 0x00, 0x00],
        Some(3) => [0x00, 0x40, 0x00],
        Some(4) => [0x20, 0x00, 0x20],
        _ => [0x00, 0x00, 0x00],
    }
}

/// Start a Bluetooth output report: HIDP header, then `report_id`.
pub(crate) fn new_output(report_id: u8) -> [u8; BT_OUTPUT_LEN] {
    let mut report = [0u8; BT_OUTPUT_LEN];
    report[0] = HIDP_OUTPUT_HEADER;
    report[1] = report_id;
    report
}

/// Append the CRC-32 the controller checks over the header and report.
pub(crate) fn seal(report: &mut [u8; BT_OUTPUT_LEN]) {
    let mut digest = Crc32Digest::new();
    digest.update_slice(&report[..CRC_OFFSET]);
    let crc = digest.finalize();
    report[CRC_OFFSET..].copy_from_slice(&crc.to_le_bytes());
}
