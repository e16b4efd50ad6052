//! Per-field HID global state.

use crate::scale;

/// Decoding context for one report field, taken from the global items in
/// effect when the field's main item was parsed.
///
/// Supplies the scale and sign needed to interpret a raw field value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidGlobals {
    /// Usage page in effect for the field.
    pub usage_page: u16,
    /// Smallest value the field reports.
    pub logical_min: i32,
    /// Largest value the field reports.
    pub logical_max: i32,
    /// Size of one element in bits (1-32).
    pub report_size: u8,
    /// Number of elements in the main item.
    pub report_count: u16,
}

impl HidGlobals {
    #[must_use]
    pub const fn new(
        usage_page: u16,
        logical_min: i32,
        logical_max: i32,
        report_size: u8,
        report_count: u16,
    ) -> Self {
        Self {
            usage_page,
            logical_min,
            logical_max,
            report_size,
            report_count,
        }
    }

    /// Whether raw values must be sign-extended.
    #[inline]
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.logical_min < 0
    }

    /// Whether `value` lies inside the logical range.
    #[inline]
    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        value >= self.logical_min && value <= self.logical_max
    }

    /// Rescale to a signed axis in `[-32767, 32767]`, clamping first.
    #[inline]
    #[must_use]
    pub fn axis(&self, value: i32) -> i16 {
        scale::axis(value, self.logical_min, self.logical_max)
    }

    /// Rescale to an unsigned 8-bit range, clamping first.
    #[inline]
    #[must_use]
    pub fn unsigned(&self, value: i32) -> u8 {
        scale::unsigned(value, self.logical_min, self.logical_max)
    }

    /// Hat switch position, `None` for the null (centered) state.
    #[inline]
    #[must_use]
    pub fn hat(&self, value: i32) -> Option<u8> {
        scale::hat_position(value, self.logical_min, self.logical_max)
    }
}
