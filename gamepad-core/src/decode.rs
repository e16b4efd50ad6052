//! Standard HID usage decoding.
//!
//! Maps the usages a generic HID gamepad reports on the Generic Desktop,
//! Simulation, Button, Generic Device Controls and Consumer pages to
//! [`GamepadFieldUpdate`]s. Controller variants call this for fields that
//! follow the standard layout and handle the rest themselves.

use hid_proto::usage::{consumer, desktop, device_controls, page, simulation};
use hid_proto::HidGlobals;

use crate::types::{Buttons, Dpad, GamepadFieldUpdate, GamepadState, MiscButtons, BATTERY_EMPTY};

/// Decode one usage of a standard gamepad.
///
/// Axes X/Y feed the left stick and Z/Rz the right stick. Rx/Ry and the
/// brake/accelerator pedals feed the analog triggers. Buttons follow the
/// common HID gamepad numbering: 1-4 face buttons, 5-6 shoulders, 7-8
/// digital triggers, 9 select, 10 start, 11-12 stick presses, 13 system.
///
/// Returns `None` for anything else.
#[must_use]
pub fn standard_usage(
    globals: &HidGlobals,
    usage_page: u16,
    usage: u16,
    value: i32,
) -> Option<GamepadFieldUpdate> {
    match usage_page {
        page::GENERIC_DESKTOP => desktop_usage(globals, usage, value),
        page::SIMULATION => match usage {
            simulation::BRAKE => Some(GamepadFieldUpdate::LeftTrigger(globals.unsigned(value))),
            simulation::ACCELERATOR => {
                Some(GamepadFieldUpdate::RightTrigger(globals.unsigned(value)))
            }
            _ => None,
        },
        page::BUTTON => button_usage(usage, value != 0),
        page::GENERIC_DEVICE_CONTROLS => match usage {
            device_controls::BATTERY_STRENGTH => Some(GamepadFieldUpdate::Battery(battery_level(
                globals, value,
            ))),
            _ => None,
        },
        page::CONSUMER => match usage {
            consumer::AC_HOME => Some(GamepadFieldUpdate::MiscButton(
                MiscButtons::SYSTEM,
                value != 0,
            )),
            consumer::AC_BACK => Some(GamepadFieldUpdate::MiscButton(
                MiscButtons::SELECT,
                value != 0,
            )),
            consumer::MENU => Some(GamepadFieldUpdate::MiscButton(
                MiscButtons::START,
                value != 0,
            )),
            _ => None,
        },
        _ => None,
    }
}

fn desktop_usage(globals: &HidGlobals, usage: u16, value: i32) -> Option<GamepadFieldUpdate> {
    let update = match usage {
        desktop::X => GamepadFieldUpdate::LeftStickX(globals.axis(value)),
        desktop::Y => GamepadFieldUpdate::LeftStickY(globals.axis(value)),
        desktop::Z => GamepadFieldUpdate::RightStickX(globals.axis(value)),
        desktop::RZ => GamepadFieldUpdate::RightStickY(globals.axis(value)),
        desktop::RX => GamepadFieldUpdate::LeftTrigger(globals.unsigned(value)),
        desktop::RY => GamepadFieldUpdate::RightTrigger(globals.unsigned(value)),
        desktop::HAT_SWITCH => GamepadFieldUpdate::Dpad(Dpad::from_hat(globals.hat(value))),
        desktop::DPAD_UP => GamepadFieldUpdate::DpadButton(Dpad::UP, value != 0),
        desktop::DPAD_DOWN => GamepadFieldUpdate::DpadButton(Dpad::DOWN, value != 0),
        desktop::DPAD_RIGHT => GamepadFieldUpdate::DpadButton(Dpad::RIGHT, value != 0),
        desktop::DPAD_LEFT => GamepadFieldUpdate::DpadButton(Dpad::LEFT, value != 0),
        desktop::SYSTEM_MAIN_MENU => GamepadFieldUpdate::MiscButton(MiscButtons::SYSTEM, value != 0),
        _ => return None,
    };
    Some(update)
}

fn button_usage(usage: u16, pressed: bool) -> Option<GamepadFieldUpdate> {
    let button = match usage {
        1 => Buttons::A,
        2 => Buttons::B,
        3 => Buttons::X,
        4 => Buttons::Y,
        5 => Buttons::LB,
        6 => Buttons::RB,
        7 => Buttons::LT,
        8 => Buttons::RT,
        9 => return Some(GamepadFieldUpdate::MiscButton(MiscButtons::SELECT, pressed)),
        10 => return Some(GamepadFieldUpdate::MiscButton(MiscButtons::START, pressed)),
        11 => Buttons::LS,
        12 => Buttons::RS,
        13 => return Some(GamepadFieldUpdate::MiscButton(MiscButtons::SYSTEM, pressed)),
        _ => return None,
    };
    Some(GamepadFieldUpdate::Button(button, pressed))
}

/// Battery strength rescaled to `BATTERY_EMPTY..=BATTERY_FULL`.
#[must_use]
pub fn battery_level(globals: &HidGlobals, value: i32) -> u8 {
    globals.unsigned(value).max(BATTERY_EMPTY)
}

/// Decode `usage` with [`standard_usage`] and apply it to `state`.
///
/// Returns whether the usage was recognized.
pub fn apply_standard_usage(
    state: &mut GamepadState,
    globals: &HidGlobals,
    usage_page: u16,
    usage: u16,
    value: i32,
) -> bool {
    match standard_usage(globals, usage_page, usage, value) {
        Some(update) => {
            state.apply_update(update);
            true
        }
        None => false,
    }
}
