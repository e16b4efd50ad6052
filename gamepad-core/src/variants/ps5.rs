//! Sony DualSense.

use hid_proto::HidGlobals;

use super::{battery_from_steps, motion_axes, sony};
use crate::output::{Capabilities, OutputError, OutputSink, PlayerLeds, Rumble};
use crate::types::{GamepadState, StatusFlags};
use crate::variant::{Variant, VariantKind};

const REPORT_USB: u8 = 0x01;
const REPORT_BT: u8 = 0x31;

/// Bytes of the input body up to and including the status byte.
const BODY_LEN: usize = 53;

// Output report fields, as indices into the header-prefixed report.
const OUT_SEQ_TAG: usize = 2;
const OUT_TAG: usize = 3;
const OUT_VALID_FLAG0: usize = 4;
const OUT_VALID_FLAG1: usize = 5;
const OUT_MOTOR_RIGHT: usize = 6;
const OUT_MOTOR_LEFT: usize = 7;
const OUT_VALID_FLAG2: usize = 42;
const OUT_LIGHTBAR_SETUP: usize = 45;
const OUT_PLAYER_LEDS: usize = 47;
const OUT_LIGHTBAR: usize = 48;

const OUTPUT_TAG: u8 = 0x10;
const VALID_FLAG0_COMPATIBLE_VIBRATION: u8 = 0x01;
const VALID_FLAG0_HAPTICS_SELECT: u8 = 0x02;
const VALID_FLAG1_LIGHTBAR: u8 = 0x04;
const VALID_FLAG1_PLAYER_LEDS: u8 = 0x10;
const VALID_FLAG2_LIGHTBAR_SETUP: u8 = 0x02;
const LIGHTBAR_SETUP_LIGHT_OUT: u8 = 0x02;

const BATTERY_STEPS: u8 = 10;
const CHARGING: u8 = 0x1;
const CHARGE_COMPLETE: u8 = 0x2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ps5 {
    /// 4-bit output sequence number.
    seq: u8,
    player_leds: u8,
    lightbar: [u8; 3],
    rumble: Rumble,
}

impl Ps5 {
    fn send_output<S: OutputSink>(
        &mut self,
        flags0: u8,
        flags1: u8,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        let mut report = sony::new_output(REPORT_BT);
        report[OUT_SEQ_TAG] = self.seq << 4;
        self.seq = (self.seq + 1) & 0x0F;
        report[OUT_TAG] = OUTPUT_TAG;
        report[OUT_VALID_FLAG0] = flags0;
        report[OUT_VALID_FLAG1] = flags1;
        report[OUT_MOTOR_RIGHT] = self.rumble.weak;
        report[OUT_MOTOR_LEFT] = self.rumble.strong;
        if flags1 != 0 {
            report[OUT_VALID_FLAG2] = VALID_FLAG2_LIGHTBAR_SETUP;
            report[OUT_LIGHTBAR_SETUP] = LIGHTBAR_SETUP_LIGHT_OUT;
        }
        report[OUT_PLAYER_LEDS] = self.player_leds;
        report[OUT_LIGHTBAR..OUT_LIGHTBAR + 3].copy_from_slice(&self.lightbar);
        sony::seal(&mut report);
        sink.send(&report)
    }
}

impl Variant for Ps5 {
    const KIND: VariantKind = VariantKind::Ps5;
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
            Some(&REPORT_BT) => 2,
            Some(&REPORT_USB) => 1,
            _ => return false,
        };
        let Some(body) = report.get(offset..offset + BODY_LEN) else {
            return false;
        };

        sony::apply_sticks(state, &body[0..4]);
        state.left_trigger = body[4];
        state.right_trigger = body[5];
        sony::apply_buttons(state, body[7], body[8], body[9]);
        if let Some(gyro) = motion_axes(body, 15) {
            state.gyro = gyro;
        }
        if let Some(accel) = motion_axes(body, 21) {
            state.accel = accel;
        }

        let status = body[52];
        let charge = status >> 4;
        state.battery = battery_from_steps(status & 0x0F, BATTERY_STEPS);
        state.status.set(StatusFlags::CHARGING, charge == CHARGING);
        state.status.set(
            StatusFlags::CABLE,
            matches!(charge, CHARGING | CHARGE_COMPLETE),
        );
        true
    }

    fn set_player_leds<S: OutputSink>(
        &mut self,
        leds: PlayerLeds,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        self.player_leds = leds.0 & 0x1F;
        self.lightbar = sony::lightbar_color(leds);
        self.send_output(0, VALID_FLAG1_LIGHTBAR | VALID_FLAG1_PLAYER_LEDS, sink)
    }

    fn set_rumble<S: OutputSink>(
        &mut self,
        rumble: Rumble,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        self.rumble = rumble;
        self.send_output(
            VALID_FLAG0_COMPATIBLE_VIBRATION | VALID_FLAG0_HAPTICS_SELECT,
            0,
            sink,
        )
    }
}
