//! Value normalization against a logical range.
//!
//! Raw values are clamped into `[logical_min, logical_max]` before being
//! rescaled, so malformed input never produces an out-of-range output.

/// Largest axis output.
pub const AXIS_MAX: i16 = 32767;

/// Smallest axis output. Symmetric with [`AXIS_MAX`] so the range centre maps to 0.
pub const AXIS_MIN: i16 = -32767;

/// Clamp `value` into `[min, max]`.
#[inline]
#[must_use]
pub fn clamp(value: i32, min: i32, max: i32) -> i32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Rescale a raw value to a signed axis in `[AXIS_MIN, AXIS_MAX]`.
///
/// A degenerate range (`min >= max`) yields the neutral value 0.
///
/// ```
/// use hid_proto::scale::axis;
///
/// assert_eq!(axis(0, -127, 127), 0);
/// assert_eq!(axis(255, 0, 255), 32767);
/// assert_eq!(axis(-4000, 0, 255), -32767);
/// ```
#[must_use]
pub fn axis(value: i32, min: i32, max: i32) -> i16 {
    if min >= max {
        return 0;
    }
    let v = i64::from(clamp(value, min, max));
    let (min, max) = (i64::from(min), i64::from(max));
    let scaled = (2 * v - min - max) * i64::from(AXIS_MAX) / (max - min);
    scaled as i16
}

/// Rescale a raw value to `[0, 255]`.
///
/// Used for triggers, pedals and battery levels.
#[must_use]
pub fn unsigned(value: i32, min: i32, max: i32) -> u8 {
    if min >= max {
        return 0;
    }
    let v = i64::from(clamp(value, min, max));
    let (min, max) = (i64::from(min), i64::from(max));
    ((v - min) * 255 / (max - min)) as u8
}

/// Map a hat switch value to one of 8 positions, clockwise from up (0).
///
/// Values outside the logical range are the null state and return `None`.
/// 8-position hats map one to one, 4-position hats onto the cardinal
/// positions, and degree-scaled hats onto 45 degree sectors.
#[must_use]
pub fn hat_position(value: i32, min: i32, max: i32) -> Option<u8> {
    if min > max || value < min || value > max {
        return None;
    }
    let positions = i64::from(max) - i64::from(min) + 1;
    let offset = i64::from(value) - i64::from(min);
    Some((offset * 8 / positions) as u8)
}
