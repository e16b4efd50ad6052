//! Controller family decoders.

mod android;
mod generic;
mod ps4;
mod ps5;
mod sony;
mod switch;
mod unknown;
mod wii;
mod xbox;

pub use android::{Android, AndroidModel, NIMBUS_PRODUCT, NIMBUS_VENDOR};
pub use generic::GenericHid;
pub use ps4::Ps4;
pub use ps5::Ps5;
pub use switch::Switch;
pub use unknown::Unknown;
pub use wii::Wii;
pub use xbox::Xbox;

use crate::types::{BATTERY_EMPTY, BATTERY_FULL};

#[inline]
pub(crate) fn i16_le(data: &[u8], offset: usize) -> Option<i16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(i16::from_le_bytes([bytes[0], bytes[1]]))
}

#[inline]
pub(crate) fn u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Three consecutive little-endian `i16` as motion axes.
pub(crate) fn motion_axes(data: &[u8], offset: usize) -> Option<[i32; 3]> {
    Some([
        i32::from(i16_le(data, offset)?),
        i32::from(i16_le(data, offset + 2)?),
        i32::from(i16_le(data, offset + 4)?),
    ])
}

/// Rescale a stepped battery gauge (`0..=max`) to the state's battery range.
pub(crate) fn battery_from_steps(level: u8, max: u8) -> u8 {
    if max == 0 {
        return BATTERY_EMPTY;
    }
    let level = u32::from(level.min(max));
    let scaled = level * u32::from(BATTERY_FULL) / u32::from(max);
    (scaled as u8).max(BATTERY_EMPTY)
}
