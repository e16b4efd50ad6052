//! Splitting input reports into usage values.

use crate::descriptor::{FieldKind, ReportField, ReportLayout};
use crate::globals::HidGlobals;

/// Read `bits` bits (at most 32) starting at `bit_offset`, least significant
/// bit first, as HID lays out report fields.
///
/// Returns `None` if the field does not fit in `data`.
#[must_use]
pub fn extract_bits(data: &[u8], bit_offset: usize, bits: u8) -> Option<u32> {
    if bits == 0 || bits > 32 {
        return None;
    }
    let end = bit_offset.checked_add(usize::from(bits))?;
    if end > data.len() * 8 {
        return None;
    }
    let mut value = 0u32;
    for i in 0..usize::from(bits) {
        let bit = bit_offset + i;
        let byte = *data.get(bit / 8)?;
        if (byte >> (bit % 8)) & 1 != 0 {
            value |= 1 << i;
        }
    }
    Some(value)
}

/// Sign-extend the low `bits` bits of `raw`.
#[inline]
#[must_use]
pub const fn sign_extend(raw: u32, bits: u8) -> i32 {
    if bits == 0 || bits >= 32 {
        return raw as i32;
    }
    let shift = 32 - bits as u32;
    ((raw << shift) as i32) >> shift
}

impl ReportField {
    /// Decode this field's raw value from a report payload (report ID byte
    /// already removed).
    #[must_use]
    pub fn read(&self, payload: &[u8]) -> Option<i32> {
        let raw = extract_bits(
            payload,
            usize::from(self.bit_offset),
            self.globals.report_size,
        )?;
        Some(if self.globals.is_signed() {
            sign_extend(raw, self.globals.report_size)
        } else {
            raw as i32
        })
    }

    /// Usage an array slot selects in `payload`, `None` for an empty slot.
    #[must_use]
    pub fn selected_usage(&self, payload: &[u8]) -> Option<u16> {
        let FieldKind::Array { usage_max } = self.kind else {
            return None;
        };
        let value = self.read(payload)?;
        if !self.globals.contains(value) {
            return None;
        }
        let usage = i64::from(self.usage) + i64::from(value) - i64::from(self.globals.logical_min);
        u16::try_from(usage).ok().filter(|&usage| usage <= usage_max)
    }

    /// Whether `other` is another slot of the same array main item.
    fn same_array(&self, other: &ReportField) -> bool {
        other.report_id == self.report_id
            && other.kind == self.kind
            && other.usage_page == self.usage_page
            && other.usage == self.usage
            && other.globals == self.globals
    }
}

/// Deliver the usages of one array main item: 0 for every usage of the range
/// no slot selects, then 1 for each selected one.
fn walk_array<F>(slots: &[ReportField], payload: &[u8], f: &mut F) -> usize
where
    F: FnMut(&HidGlobals, u16, u16, i32),
{
    let Some(first) = slots.first() else {
        return 0;
    };
    let FieldKind::Array { usage_max } = first.kind else {
        return 0;
    };
    if first.read(payload).is_none() {
        return 0;
    }

    let mut delivered = 0;
    for usage in first.usage..=usage_max {
        if !slots
            .iter()
            .any(|slot| slot.selected_usage(payload) == Some(usage))
        {
            f(&first.globals, first.usage_page, usage, 0);
            delivered += 1;
        }
    }
    for usage in slots.iter().filter_map(|slot| slot.selected_usage(payload)) {
        f(&first.globals, first.usage_page, usage, 1);
        delivered += 1;
    }
    delivered
}

impl ReportLayout {
    /// Walk every input field of `report`, calling
    /// `f(globals, usage_page, usage, value)` for each one present.
    ///
    /// When the layout uses report IDs, the first byte selects the report and
    /// only its fields are visited. Fields beyond the end of a short report are
    /// skipped. An array reports every usage of its range: 0 for the ones no
    /// slot selects, then 1 for the selected ones.
    ///
    /// Returns the number of values delivered.
    pub fn for_each_input<F>(&self, report: &[u8], mut f: F) -> usize
    where
        F: FnMut(&HidGlobals, u16, u16, i32),
    {
        let (report_id, payload) = if self.uses_report_ids() {
            match report.split_first() {
                Some((&id, rest)) => (id, rest),
                None => return 0,
            }
        } else {
            (0, report)
        };

        let fields = self.fields();
        let mut delivered = 0;
        let mut i = 0;
        while let Some(field) = fields.get(i) {
            let start = i;
            i += 1;
            if field.report_id != report_id {
                continue;
            }
            match field.kind {
                FieldKind::Variable => {
                    if let Some(value) = field.read(payload) {
                        f(&field.globals, field.usage_page, field.usage, value);
                        delivered += 1;
                    }
                }
                FieldKind::Array { .. } => {
                    i += fields[i..]
                        .iter()
                        .take_while(|next| field.same_array(next))
                        .count();
                    delivered += walk_array(&fields[start..i], payload, &mut f);
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::descriptor::tests::{GAMEPAD_DESCRIPTOR, REPORT_ID_DESCRIPTOR};
    use crate::usage::{desktop, page, simulation};
    use std::vec::Vec;

    #[test]
    fn test_extract_bits() {
        let data = [0b1010_1100, 0b0000_0011];
        assert_eq!(extract_bits(&data, 0, 1), Some(0));
        assert_eq!(extract_bits(&data, 2, 1), Some(1));
        assert_eq!(extract_bits(&data, 0, 8), Some(0xAC));
        assert_eq!(extract_bits(&data, 4, 8), Some(0x3A));
        assert_eq!(extract_bits(&data, 0, 16), Some(0x03AC));
        assert_eq!(extract_bits(&data, 9, 8), None);
        assert_eq!(extract_bits(&data, 0, 0), None);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0xFF, 8), -1);
        assert_eq!(sign_extend(0x81, 8), -127);
        assert_eq!(sign_extend(0x7F, 8), 127);
        assert_eq!(sign_extend(0x200, 10), -512);
        assert_eq!(sign_extend(0xFFFF_FFFF, 32), -1);
    }

    #[test]
    fn test_walk_standard_gamepad_report() {
        let layout = ReportLayout::parse(GAMEPAD_DESCRIPTOR).unwrap();
        // Buttons 1 and 10, X=-127, Y=127, Z=0, Rz=-1, Rx=255, Ry=0
        let report = [0x01, 0x02, 0x81, 0x7F, 0x00, 0xFF, 0xFF, 0x00];

        let mut seen = Vec::new();
        let delivered = layout.for_each_input(&report, |_, p, u, v| seen.push((p, u, v)));
        assert_eq!(delivered, 22);

        assert!(seen.contains(&(page::BUTTON, 1, 1)));
        assert!(seen.contains(&(page::BUTTON, 2, 0)));
        assert!(seen.contains(&(page::BUTTON, 10, 1)));
        assert!(seen.contains(&(page::GENERIC_DESKTOP, desktop::X, -127)));
        assert!(seen.contains(&(page::GENERIC_DESKTOP, desktop::Y, 127)));
        assert!(seen.contains(&(page::GENERIC_DESKTOP, desktop::RZ, -1)));
        assert!(seen.contains(&(page::GENERIC_DESKTOP, desktop::RX, 255)));
        assert!(seen.contains(&(page::GENERIC_DESKTOP, desktop::RY, 0)));
    }

    #[test]
    fn test_walk_skips_fields_of_short_report() {
        let layout = ReportLayout::parse(GAMEPAD_DESCRIPTOR).unwrap();
        // Only the button bytes arrived
        let delivered = layout.for_each_input(&[0x00, 0x00], |_, _, _, _| {});
        assert_eq!(delivered, 16);
    }

    #[test]
    fn test_walk_filters_by_report_id() {
        let layout = ReportLayout::parse(REPORT_ID_DESCRIPTOR).unwrap();

        // Report 1: hat = 2 (right), accelerator = 0x3FF
        let mut seen = Vec::new();
        layout.for_each_input(&[0x01, 0x02, 0xFF, 0x03], |g, p, u, v| {
            seen.push((p, u, v, g.logical_max))
        });
        assert_eq!(
            seen,
            [
                (page::GENERIC_DESKTOP, desktop::HAT_SWITCH, 2, 7),
                (page::SIMULATION, simulation::ACCELERATOR, 1023, 1023),
            ]
        );

        // Vendor report 2 yields nothing
        assert_eq!(layout.for_each_input(&[0x02, 1, 2, 3, 4, 5, 6, 7, 8], |_, _, _, _| {}), 0);
        assert_eq!(layout.for_each_input(&[], |_, _, _, _| {}), 0);
    }

    #[test]
    fn test_walk_array_field_press_then_release() {
        let descriptor = [
            0x05, 0x09, // Usage Page (Button)
            0x19, 0x01, // Usage Minimum (1)
            0x29, 0x08, // Usage Maximum (8)
            0x15, 0x01, // Logical Minimum (1)
            0x25, 0x08, // Logical Maximum (8)
            0x75, 0x08, // Report Size (8)
            0x95, 0x02, // Report Count (2)
            0x81, 0x00, // Input (Data, Array, Absolute)
        ];
        let layout = ReportLayout::parse(&descriptor).unwrap();

        let mut seen = Vec::new();
        let delivered = layout.for_each_input(&[0x03, 0x00], |_, p, u, v| seen.push((p, u, v)));
        assert_eq!(delivered, 8);
        assert_eq!(seen.last(), Some(&(page::BUTTON, 3, 1)));
        assert!(seen.contains(&(page::BUTTON, 1, 0)));
        assert!(seen.contains(&(page::BUTTON, 8, 0)));
        assert!(!seen.contains(&(page::BUTTON, 3, 0)));

        // Both slots held
        seen.clear();
        layout.for_each_input(&[0x03, 0x05], |_, p, u, v| seen.push((p, u, v)));
        assert_eq!(seen.len(), 8);
        assert_eq!(&seen[6..], &[(page::BUTTON, 3, 1), (page::BUTTON, 5, 1)]);

        // Released: every usage goes back to 0
        seen.clear();
        layout.for_each_input(&[0x00, 0x00], |_, p, u, v| seen.push((p, u, v)));
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|&(_, _, v)| v == 0));

        assert_eq!(layout.for_each_input(&[], |_, _, _, _| {}), 0);
    }
}
