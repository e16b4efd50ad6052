//! Devices nothing could be made of: tracked as connected, never decoded.

use hid_proto::HidGlobals;

use crate::types::GamepadState;
use crate::variant::{Variant, VariantKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unknown;

impl Variant for Unknown {
    const KIND: VariantKind = VariantKind::Unknown;

    fn parse_usage(
        &mut self,
        _state: &mut GamepadState,
        _globals: &HidGlobals,
        _usage_page: u16,
        _usage: u16,
        _value: i32,
    ) {
    }

    fn parse_raw_report(&mut self, _report: &[u8], _state: &mut GamepadState) -> bool {
        true
    }
}
