//! Android gamepads (Nvidia Shield, Stadia, generic "Android mode" pads).
//!
//! These follow the Android HID gamepad guidelines, so everything is
//! usage-based. The face buttons skip usages 3 and 6, and the menu buttons
//! live on the Consumer page. The SteelSeries Nimbus also takes player LEDs.

use hid_proto::usage::{consumer, page};
use hid_proto::HidGlobals;

use crate::decode;
use crate::device::DeviceIdentity;
use crate::output::{Capabilities, OutputError, OutputSink, PlayerLeds, HIDP_OUTPUT_HEADER};
use crate::types::{Buttons, GamepadState, MiscButtons};
use crate::variant::{Variant, VariantKind};

pub const NIMBUS_VENDOR: u16 = 0x0111;
pub const NIMBUS_PRODUCT: u16 = 0x1420;

/// Nimbus LED output report: one byte per LED, player 1 first.
const NIMBUS_LED_REPORT_ID: u8 = 0x02;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AndroidModel {
    #[default]
    Generic,
    Nimbus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Android {
    model: AndroidModel,
}

impl Android {
    #[must_use]
    pub const fn new(model: AndroidModel) -> Self {
        Self { model }
    }

    #[inline]
    #[must_use]
    pub const fn model(&self) -> AndroidModel {
        self.model
    }
}

impl Variant for Android {
    const KIND: VariantKind = VariantKind::Android;

    fn identify(&mut self, identity: &DeviceIdentity) {
        self.model = if identity.vendor_id == NIMBUS_VENDOR && identity.product_id == NIMBUS_PRODUCT
        {
            AndroidModel::Nimbus
        } else {
            AndroidModel::Generic
        };
    }

    fn capabilities(&self) -> Capabilities {
        match self.model {
            AndroidModel::Nimbus => Capabilities {
                player_leds: true,
                rumble: false,
            },
            AndroidModel::Generic => Self::CAPABILITIES,
        }
    }

    // The model outlives resets
    fn init_report(&mut self, state: &mut GamepadState) {
        *state = GamepadState::neutral();
    }

    fn set_player_leds<S: OutputSink>(
        &mut self,
        leds: PlayerLeds,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        if self.model != AndroidModel::Nimbus {
            return Ok(());
        }
        let mut report = [0u8; 6];
        report[0] = HIDP_OUTPUT_HEADER;
        report[1] = NIMBUS_LED_REPORT_ID;
        for (i, led) in report[2..].iter_mut().enumerate() {
            if leds.0 & (1 << i) != 0 {
                *led = 0xFF;
            }
        }
        sink.send(&report)
    }

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
            (page::BUTTON, 0x0E) => state.buttons.set(Buttons::LS, pressed),
            (page::BUTTON, 0x0F) => state.buttons.set(Buttons::RS, pressed),
            (page::BUTTON, _) => {}
            (page::CONSUMER, consumer::AC_BACK) => {
                state.misc_buttons.set(MiscButtons::SELECT, pressed)
            }
            (page::CONSUMER, consumer::MENU) => {
                state.misc_buttons.set(MiscButtons::START, pressed)
            }
            (page::CONSUMER, consumer::AC_HOME) => {
                state.misc_buttons.set(MiscButtons::SYSTEM, pressed)
            }
            (page::CONSUMER, consumer::RECORD) => {
                state.misc_buttons.set(MiscButtons::CAPTURE, pressed)
            }
            _ => {
                decode::apply_standard_usage(state, globals, usage_page, usage, value);
            }
        }
    }
}
