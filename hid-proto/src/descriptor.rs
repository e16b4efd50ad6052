//! HID report descriptor parser.
//!
//! Walks the item stream of a report descriptor and records one
//! [`ReportField`] per input element, each carrying the [`HidGlobals`] in
//! effect for it. Only what a gamepad decoder needs is kept:
//!
//! - Output and feature items are skipped (they do not move input offsets)
//! - Constant (padding) input items advance the bit offset but are not recorded
//! - Vendor-defined usages are not recorded
//! - Delimiters, designators and string items are ignored
//!
//! Push/pop of the global state and 32-bit extended usages are supported.

use heapless::Vec;

use crate::globals::HidGlobals;
use crate::usage::{self, page};

/// Maximum number of input fields kept per device.
pub const MAX_FIELDS: usize = 96;

/// Maximum number of application collections remembered.
pub const MAX_APPLICATIONS: usize = 4;

const MAX_LOCAL_USAGES: usize = 16;
const MAX_GLOBAL_STACK: usize = 4;
const MAX_REPORT_IDS: usize = 16;

/// Item prefix of a long item.
const LONG_ITEM: u8 = 0xFE;

// Item tags with the type bits included and the size bits masked off.
const TAG_INPUT: u8 = 0x80;
const TAG_OUTPUT: u8 = 0x90;
const TAG_FEATURE: u8 = 0xB0;
const TAG_COLLECTION: u8 = 0xA0;
const TAG_USAGE_PAGE: u8 = 0x04;
const TAG_LOGICAL_MIN: u8 = 0x14;
const TAG_LOGICAL_MAX: u8 = 0x24;
const TAG_REPORT_SIZE: u8 = 0x74;
const TAG_REPORT_ID: u8 = 0x84;
const TAG_REPORT_COUNT: u8 = 0x94;
const TAG_PUSH: u8 = 0xA4;
const TAG_POP: u8 = 0xB4;
const TAG_USAGE: u8 = 0x08;
const TAG_USAGE_MIN: u8 = 0x18;
const TAG_USAGE_MAX: u8 = 0x28;

const COLLECTION_APPLICATION: u32 = 0x01;

const MAIN_CONSTANT: u32 = 1 << 0;
const MAIN_VARIABLE: u32 = 1 << 1;

/// Error raised while parsing a report descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DescriptorError {
    /// An item claims more data than the descriptor holds.
    Truncated,
    /// More input fields than [`MAX_FIELDS`].
    TooManyFields,
    /// More distinct report IDs than the parser tracks.
    TooManyReportIds,
    /// Push nested deeper than the parser supports.
    GlobalStackOverflow,
    /// Pop without a matching push.
    GlobalStackUnderflow,
    /// Report size larger than 32 bits.
    ReportSizeTooLarge,
}

/// How the value of a field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldKind {
    /// The value belongs to the field's usage.
    Variable,
    /// The value selects a usage between the field's usage and `usage_max`.
    Array { usage_max: u16 },
}

/// One input element of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportField {
    /// Report ID the field belongs to (0 when the device uses no IDs).
    pub report_id: u8,
    /// Bit offset from the start of the report payload (after the ID byte).
    pub bit_offset: u16,
    pub globals: HidGlobals,
    pub usage_page: u16,
    /// Usage, or the first usage of the range for array fields.
    pub usage: u16,
    pub kind: FieldKind,
}

/// Input fields of a device, derived from its report descriptor.
#[derive(Debug, Clone, Default)]
pub struct ReportLayout {
    fields: Vec<ReportField, MAX_FIELDS>,
    applications: Vec<(u16, u16), MAX_APPLICATIONS>,
    uses_report_ids: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct GlobalState {
    usage_page: u16,
    logical_min: i32,
    logical_max: i32,
    /// Logical maximum read as unsigned, for descriptors that encode
    /// `255` as the single byte `0xFF`.
    logical_max_unsigned: u32,
    report_size: u32,
    report_count: u32,
    report_id: u8,
}

impl GlobalState {
    fn logical_range(&self) -> (i32, i32) {
        if self.logical_min >= 0 && self.logical_max < self.logical_min {
            let max = i32::try_from(self.logical_max_unsigned).unwrap_or(i32::MAX);
            (self.logical_min, max)
        } else {
            (self.logical_min, self.logical_max)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LocalUsage {
    page: Option<u16>,
    id: u16,
}

impl LocalUsage {
    fn from_item(value: u32, size: usize) -> Self {
        if size == 4 {
            Self {
                page: Some((value >> 16) as u16),
                id: value as u16,
            }
        } else {
            Self {
                page: None,
                id: value as u16,
            }
        }
    }

    fn resolve(self, current_page: u16) -> (u16, u16) {
        (self.page.unwrap_or(current_page), self.id)
    }
}

#[derive(Debug, Default)]
struct LocalState {
    usages: Vec<LocalUsage, MAX_LOCAL_USAGES>,
    usage_min: Option<LocalUsage>,
    usage_max: Option<LocalUsage>,
}

impl LocalState {
    fn clear(&mut self) {
        self.usages.clear();
        self.usage_min = None;
        self.usage_max = None;
    }

    /// Usage of the `index`-th element of a variable item. The last listed
    /// usage repeats for the remaining elements.
    fn usage_at(&self, index: u32, current_page: u16) -> Option<(u16, u16)> {
        if let Some(last) = self.usages.last() {
            let usage = usize::try_from(index)
                .ok()
                .and_then(|i| self.usages.get(i))
                .unwrap_or(last);
            return Some(usage.resolve(current_page));
        }
        let (page, min) = self.usage_min?.resolve(current_page);
        let max = self.usage_max.map_or(u16::MAX, |m| m.id);
        let id = u32::from(min).saturating_add(index).min(u32::from(max));
        Some((page, id as u16))
    }

    /// Usage range selected by the elements of an array item.
    fn array_range(&self, current_page: u16) -> Option<(u16, u16, u16)> {
        if let Some(min) = self.usage_min {
            let (page, min) = min.resolve(current_page);
            let max = self.usage_max.map_or(min, |m| m.id);
            return Some((page, min, max.max(min)));
        }
        let first = self.usages.first()?;
        let (page, min) = first.resolve(current_page);
        let span = self.usages.len().saturating_sub(1) as u16;
        Some((page, min, min.saturating_add(span)))
    }
}

impl ReportLayout {
    /// An empty layout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
            applications: Vec::new(),
            uses_report_ids: false,
        }
    }

    /// Parse a report descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] describing the first malformed item.
    pub fn parse(descriptor: &[u8]) -> Result<Self, DescriptorError> {
        let mut layout = Self::new();
        layout.parse_items(descriptor)?;
        Ok(layout)
    }

    /// Parse a report descriptor, keeping whatever was gathered before the
    /// first malformed item.
    #[must_use]
    pub fn parse_lossy(descriptor: &[u8]) -> Self {
        let mut layout = Self::new();
        if let Err(e) = layout.parse_items(descriptor) {
            warn!(
                "report descriptor: {:?}, kept {} fields",
                e,
                layout.fields.len()
            );
        }
        layout
    }

    /// All recorded input fields, in descriptor order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[ReportField] {
        &self.fields
    }

    /// Whether input reports are prefixed with a report ID byte.
    #[inline]
    #[must_use]
    pub const fn uses_report_ids(&self) -> bool {
        self.uses_report_ids
    }

    /// Application collections as `(usage page, usage)` pairs.
    #[inline]
    #[must_use]
    pub fn applications(&self) -> &[(u16, u16)] {
        &self.applications
    }

    /// Whether any input field reports `usage` on `usage_page`.
    #[must_use]
    pub fn has_usage(&self, usage_page: u16, usage: u16) -> bool {
        self.fields.iter().any(|f| {
            f.usage_page == usage_page
                && match f.kind {
                    FieldKind::Variable => f.usage == usage,
                    FieldKind::Array { usage_max } => (f.usage..=usage_max).contains(&usage),
                }
        })
    }

    /// Whether the layout looks like something a generic gamepad decoder
    /// can use: a joystick/gamepad application, or at least one standard
    /// axis, hat or button field.
    #[must_use]
    pub fn is_gamepad_like(&self) -> bool {
        if self
            .applications
            .iter()
            .any(|&(p, u)| usage::is_gamepad_application(p, u))
        {
            return true;
        }
        self.fields.iter().any(|f| match f.usage_page {
            page::GENERIC_DESKTOP => matches!(
                f.usage,
                usage::desktop::X..=usage::desktop::RZ | usage::desktop::HAT_SWITCH
            ),
            page::BUTTON => true,
            _ => false,
        })
    }

    fn parse_items(&mut self, data: &[u8]) -> Result<(), DescriptorError> {
        let mut global = GlobalState::default();
        let mut stack: Vec<GlobalState, MAX_GLOBAL_STACK> = Vec::new();
        let mut local = LocalState::default();
        let mut offsets: Vec<(u8, u32), MAX_REPORT_IDS> = Vec::new();

        let mut pos = 0;
        while let Some(&prefix) = data.get(pos) {
            if prefix == LONG_ITEM {
                let size = usize::from(*data.get(pos + 1).ok_or(DescriptorError::Truncated)?);
                pos += 3 + size;
                if pos > data.len() {
                    return Err(DescriptorError::Truncated);
                }
                continue;
            }

            let size = match prefix & 0x03 {
                0 => 0,
                1 => 1,
                2 => 2,
                _ => 4,
            };
            let payload = data
                .get(pos + 1..pos + 1 + size)
                .ok_or(DescriptorError::Truncated)?;
            let unsigned = payload
                .iter()
                .rev()
                .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
            let signed = match size {
                1 => i32::from(unsigned as u8 as i8),
                2 => i32::from(unsigned as u16 as i16),
                _ => unsigned as i32,
            };

            match prefix & 0xFC {
                TAG_USAGE_PAGE => global.usage_page = unsigned as u16,
                TAG_LOGICAL_MIN => global.logical_min = signed,
                TAG_LOGICAL_MAX => {
                    global.logical_max = signed;
                    global.logical_max_unsigned = unsigned;
                }
                TAG_REPORT_SIZE => global.report_size = unsigned,
                TAG_REPORT_ID => {
                    global.report_id = unsigned as u8;
                    self.uses_report_ids = true;
                }
                TAG_REPORT_COUNT => global.report_count = unsigned,
                TAG_PUSH => stack
                    .push(global)
                    .map_err(|_| DescriptorError::GlobalStackOverflow)?,
                TAG_POP => global = stack.pop().ok_or(DescriptorError::GlobalStackUnderflow)?,
                TAG_USAGE => {
                    // Usages past the local capacity repeat the last one kept.
                    let _ = local.usages.push(LocalUsage::from_item(unsigned, size));
                }
                TAG_USAGE_MIN => local.usage_min = Some(LocalUsage::from_item(unsigned, size)),
                TAG_USAGE_MAX => local.usage_max = Some(LocalUsage::from_item(unsigned, size)),
                TAG_COLLECTION => {
                    if unsigned == COLLECTION_APPLICATION {
                        if let Some(first) = local.usages.first() {
                            let _ = self.applications.push(first.resolve(global.usage_page));
                        }
                    }
                    local.clear();
                }
                TAG_INPUT => {
                    self.add_input(&global, &local, unsigned, &mut offsets)?;
                    local.clear();
                }
                TAG_OUTPUT | TAG_FEATURE => local.clear(),
                _ => {}
            }

            pos += 1 + size;
        }

        trace!("report descriptor: {} input fields", self.fields.len());
        Ok(())
    }

    fn add_input(
        &mut self,
        global: &GlobalState,
        local: &LocalState,
        flags: u32,
        offsets: &mut Vec<(u8, u32), MAX_REPORT_IDS>,
    ) -> Result<(), DescriptorError> {
        if global.report_size > 32 {
            return Err(DescriptorError::ReportSizeTooLarge);
        }

        let slot = match offsets.iter().position(|&(id, _)| id == global.report_id) {
            Some(i) => i,
            None => {
                offsets
                    .push((global.report_id, 0))
                    .map_err(|_| DescriptorError::TooManyReportIds)?;
                offsets.len() - 1
            }
        };
        let start = offsets.get(slot).map_or(0, |&(_, offset)| offset);
        let total = global.report_size.saturating_mul(global.report_count);
        if let Some(entry) = offsets.get_mut(slot) {
            entry.1 = start.saturating_add(total);
        }

        if flags & MAIN_CONSTANT != 0 || global.report_size == 0 {
            return Ok(());
        }

        let (logical_min, logical_max) = global.logical_range();
        let globals = HidGlobals::new(
            global.usage_page,
            logical_min,
            logical_max,
            global.report_size as u8,
            global.report_count.min(u32::from(u16::MAX)) as u16,
        );

        if flags & MAIN_VARIABLE != 0 {
            for i in 0..global.report_count {
                let Some((usage_page, usage)) = local.usage_at(i, global.usage_page) else {
                    break;
                };
                let bit_offset = start.saturating_add(i.saturating_mul(global.report_size));
                self.push_field(ReportField {
                    report_id: global.report_id,
                    bit_offset: bit_offset.min(u32::from(u16::MAX)) as u16,
                    globals,
                    usage_page,
                    usage,
                    kind: FieldKind::Variable,
                })?;
            }
        } else if let Some((usage_page, usage_min, usage_max)) =
            local.array_range(global.usage_page)
        {
            for i in 0..global.report_count {
                let bit_offset = start.saturating_add(i.saturating_mul(global.report_size));
                self.push_field(ReportField {
                    report_id: global.report_id,
                    bit_offset: bit_offset.min(u32::from(u16::MAX)) as u16,
                    globals,
                    usage_page,
                    usage: usage_min,
                    kind: FieldKind::Array { usage_max },
                })?;
            }
        }
        Ok(())
    }

    fn push_field(&mut self, field: ReportField) -> Result<(), DescriptorError> {
        if field.usage_page >= page::VENDOR_DEFINED_START {
            return Ok(());
        }
        self.fields
            .push(field)
            .map_err(|_| DescriptorError::TooManyFields)
    }
}
