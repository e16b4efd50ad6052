//! Sony DualShock 4.
//!
//! Input comes as report 0x11 over Bluetooth once the controller is in full
//! mode, or report 0x01 with the same body at a different offset. Output is
//! report 0x11, CRC-32 sealed, carrying rumble and the lightbar color that
//! stands in for player LEDs.

use hid_proto::HidGlobals;

use super::{battery_from_steps, motion_axes, sony};
use crate::output::{Capabilities, OutputError, OutputSink, PlayerLeds, Rumble};
use crate::types::{GamepadState, StatusFlags};
use crate::variant::{Variant, VariantKind};

const REPORT_USB: u8 = 0x01;
const REPORT_BT: u8 = 0x11;

/// Bytes of the input body up to and including the status byte.
const BODY_LEN: usize = 30;

const OUTPUT_FLAG_RUMBLE: u8 = 0x01;
const OUTPUT_FLAG_LIGHTBAR: u8 = 0x02;

const STATUS_CABLE: u8 = 0x10;
const BATTERY_STEPS: u8 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ps4 {
    lightbar: [u8; 3],
    rumble: Rumble,
}

impl Ps4 {
    fn send_output<S: OutputSink>(&self, sink: &mut S) -> Result<(), OutputError> {
        let mut report = sony::new_output(REPORT_BT);
        report[2] = 0xC0;
        report[3] = 0x20;
        report[4] = OUTPUT_FLAG_RUMBLE | OUTPUT_FLAG_LIGHTBAR;
        report[7] = self.rumble.weak;
        report[8] = self.rumble.strong;
        report[9..12].copy_from_slice(&self.lightbar);
        sony::seal(&mut report);
        sink.send(&report)
    }
}

impl Variant for Ps4 {
    const KIND: VariantKind = VariantKind::Ps4;
    const CAPABILITIES: Capabilities = Capabilities {
        player_leds: true,
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
        sony::parse_usage(state, globals, usage_page, usage, value);
    }

    fn parse_raw_report(&mut self, report: &[u8], state: &mut GamepadState) -> bool {
        let offset = match report.first() {
            Some(&REPORT_BT) => 3,
            Some(&REPORT_USB) => 1,
            _ => return false,
        };
        let Some(body) = report.get(offset..offset + BODY_LEN) else {
            return false;
        };

        sony::apply_sticks(state, &body[0..4]);
        sony::apply_buttons(state, body[4], body[5], body[6]);
        state.left_trigger = body[7];
        state.right_trigger = body[8];
        if let Some(gyro) = motion_axes(body, 12) {
            state.gyro = gyro;
        }
        if let Some(accel) = motion_axes(body, 18) {
            state.accel = accel;
        }

        let status = body[29];
        let level = status & 0x0F;
        let cable = status & STATUS_CABLE != 0;
        state.battery = battery_from_steps(level, BATTERY_STEPS);
        state.status.set(StatusFlags::CABLE, cable);
        state.status.set(StatusFlags::CHARGING, cable && level <= BATTERY_STEPS);
        true
    }

    fn set_player_leds<S: OutputSink>(
        &mut self,
        leds: PlayerLeds,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        self.lightbar = sony::lightbar_color(leds);
        self.send_output(sink)
    }

    fn set_rumble<S: OutputSink>(
        &mut self,
        rumble: Rumble,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        self.rumble = rumble;
        self.send_output(sink)
    }
}
