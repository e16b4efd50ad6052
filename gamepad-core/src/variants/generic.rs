//! Best-effort decoder for HID gamepads no other variant claims.

use hid_proto::HidGlobals;

use crate::decode;
use crate::types::GamepadState;
use crate::variant::{Variant, VariantKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericHid;

impl Variant for GenericHid {
    const KIND: VariantKind = VariantKind::GenericHid;

    fn parse_usage(
        &mut self,
        state: &mut GamepadState,
        globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        if !decode::apply_standard_usage(state, globals, usage_page, usage, value) {
            trace!("generic: ignored usage {:#x}:{:#x}", usage_page, usage);
        }
    }
}
