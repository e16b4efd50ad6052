//! Core gamepad types: Buttons, MiscButtons, Dpad, AnalogStick, GamepadState,
//! GamepadFieldUpdate.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

macro_rules! impl_flag_ops {
    ($ty:ident, $raw:ty) => {
        impl $ty {
            /// Nothing set.
            pub const NONE: Self = Self(0);

            /// Check if all of the given flag(s) are set.
            #[inline]
            #[must_use]
            pub const fn contains(self, other: $ty) -> bool {
                (self.0 & other.0) == other.0
            }

            /// Check if the given flag is set (alias for contains).
            #[inline]
            #[must_use]
            pub const fn is_pressed(self, other: $ty) -> bool {
                self.contains(other)
            }

            /// Set or clear flag(s).
            #[inline]
            pub fn set(&mut self, other: $ty, on: bool) {
                if on {
                    self.0 |= other.0;
                } else {
                    self.0 &= !other.0;
                }
            }

            #[inline]
            #[must_use]
            pub const fn raw(self) -> $raw {
                self.0
            }

            #[inline]
            #[must_use]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }
        }

        impl BitOr for $ty {
            type Output = Self;

            #[inline]
            fn bitor(self, rhs: Self) -> Self::Output {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $ty {
            #[inline]
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $ty {
            type Output = Self;

            #[inline]
            fn bitand(self, rhs: Self) -> Self::Output {
                Self(self.0 & rhs.0)
            }
        }

        impl BitAndAssign for $ty {
            #[inline]
            fn bitand_assign(&mut self, rhs: Self) {
                self.0 &= rhs.0;
            }
        }

        impl Not for $ty {
            type Output = Self;

            #[inline]
            fn not(self) -> Self::Output {
                Self(!self.0)
            }
        }
    };
}

/// Face, shoulder, trigger and thumb buttons as a bitfield.
///
/// Named after the Xbox layout: `A` is the bottom face button on every
/// controller family, whatever its label.
///
/// # Example
///
/// ```
/// use gamepad_core::Buttons;
///
/// let buttons = Buttons::A | Buttons::B;
/// assert!(buttons.contains(Buttons::A));
/// assert!(buttons.contains(Buttons::B));
/// assert!(!buttons.contains(Buttons::X));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u16);

impl Buttons {
    pub const A: Self = Self(1 << 0);
    pub const B: Self = Self(1 << 1);
    pub const X: Self = Self(1 << 2);
    pub const Y: Self = Self(1 << 3);
    pub const LB: Self = Self(1 << 4); // Left shoulder
    pub const RB: Self = Self(1 << 5); // Right shoulder
    pub const LT: Self = Self(1 << 6); // Left trigger, digital
    pub const RT: Self = Self(1 << 7); // Right trigger, digital
    pub const LS: Self = Self(1 << 8); // Left stick press
    pub const RS: Self = Self(1 << 9); // Right stick press
}

impl_flag_ops!(Buttons, u16);

/// System and menu buttons.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MiscButtons(pub u8);

impl MiscButtons {
    /// PS, Xbox, Home.
    pub const SYSTEM: Self = Self(1 << 0);
    /// Select, Back, Share, Minus.
    pub const SELECT: Self = Self(1 << 1);
    /// Start, Menu, Options, Plus.
    pub const START: Self = Self(1 << 2);
    /// Capture, Share (Xbox Series), touchpad click.
    pub const CAPTURE: Self = Self(1 << 3);
}

impl_flag_ops!(MiscButtons, u8);

/// D-pad directions. Diagonals set two bits.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dpad(pub u8);

impl Dpad {
    pub const UP: Self = Self(1 << 0);
    pub const DOWN: Self = Self(1 << 1);
    pub const RIGHT: Self = Self(1 << 2);
    pub const LEFT: Self = Self(1 << 3);

    /// Convert a hat position (0 = up, clockwise in 45 degree steps) to
    /// directions. `None` and positions above 7 are centered.
    #[must_use]
    pub const fn from_hat(position: Option<u8>) -> Self {
        match position {
            Some(0) => Self::UP,
            Some(1) => Self(Self::UP.0 | Self::RIGHT.0),
            Some(2) => Self::RIGHT,
            Some(3) => Self(Self::DOWN.0 | Self::RIGHT.0),
            Some(4) => Self::DOWN,
            Some(5) => Self(Self::DOWN.0 | Self::LEFT.0),
            Some(6) => Self::LEFT,
            Some(7) => Self(Self::UP.0 | Self::LEFT.0),
            _ => Self::NONE,
        }
    }
}

impl_flag_ops!(Dpad, u8);

/// Device status reported alongside input.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusFlags(pub u8);

impl StatusFlags {
    /// Battery is charging.
    pub const CHARGING: Self = Self(1 << 0);
    /// USB cable attached.
    pub const CABLE: Self = Self(1 << 1);
}

impl_flag_ops!(StatusFlags, u8);

/// Battery level is not reported by the device.
pub const BATTERY_UNAVAILABLE: u8 = 0;
/// Lowest reportable battery level.
pub const BATTERY_EMPTY: u8 = 1;
/// Highest reportable battery level.
pub const BATTERY_FULL: u8 = 255;

/// Analog stick with X/Y axes.
///
/// Range: [-32767, 32767], 0 centered. Y grows downwards.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogStick {
    pub x: i16,
    pub y: i16,
}

impl AnalogStick {
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub const NEUTRAL: Self = Self { x: 0, y: 0 };
}

/// Complete gamepad state snapshot.
///
/// Contains all inputs a controller family may report:
/// - 10 buttons, 4 misc buttons and the D-pad (bitfields)
/// - 2 analog sticks (left/right, each with X/Y)
/// - 2 analog triggers (left/right, 0-255)
/// - battery level and status flags
/// - raw gyroscope and accelerometer readings, when the device has them
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GamepadState {
    pub buttons: Buttons,
    pub misc_buttons: MiscButtons,
    pub dpad: Dpad,
    pub left_stick: AnalogStick,
    pub right_stick: AnalogStick,
    pub left_trigger: u8,
    pub right_trigger: u8,
    /// [`BATTERY_UNAVAILABLE`], or [`BATTERY_EMPTY`]..=[`BATTERY_FULL`].
    pub battery: u8,
    pub status: StatusFlags,
    pub gyro: [i32; 3],
    pub accel: [i32; 3],
}

impl GamepadState {
    /// Create a neutral gamepad state (no buttons pressed, sticks centered,
    /// battery unknown).
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: Buttons::NONE,
            misc_buttons: MiscButtons::NONE,
            dpad: Dpad::NONE,
            left_stick: AnalogStick::NEUTRAL,
            right_stick: AnalogStick::NEUTRAL,
            left_trigger: 0,
            right_trigger: 0,
            battery: BATTERY_UNAVAILABLE,
            status: StatusFlags::NONE,
            gyro: [0; 3],
            accel: [0; 3],
        }
    }

    /// Whether no input is active. Battery and status are not input.
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.buttons.is_empty()
            && self.misc_buttons.is_empty()
            && self.dpad.is_empty()
            && self.left_stick == AnalogStick::NEUTRAL
            && self.right_stick == AnalogStick::NEUTRAL
            && self.left_trigger == 0
            && self.right_trigger == 0
    }

    /// Apply a single field update to this state.
    #[inline]
    pub fn apply_update(&mut self, update: GamepadFieldUpdate) {
        match update {
            GamepadFieldUpdate::Buttons(b) => self.buttons = b,
            GamepadFieldUpdate::Button(b, pressed) => self.buttons.set(b, pressed),
            GamepadFieldUpdate::MiscButton(b, pressed) => self.misc_buttons.set(b, pressed),
            GamepadFieldUpdate::Dpad(d) => self.dpad = d,
            GamepadFieldUpdate::DpadButton(d, pressed) => self.dpad.set(d, pressed),
            GamepadFieldUpdate::LeftStickX(x) => self.left_stick.x = x,
            GamepadFieldUpdate::LeftStickY(y) => self.left_stick.y = y,
            GamepadFieldUpdate::RightStickX(x) => self.right_stick.x = x,
            GamepadFieldUpdate::RightStickY(y) => self.right_stick.y = y,
            GamepadFieldUpdate::LeftTrigger(t) => self.left_trigger = t,
            GamepadFieldUpdate::RightTrigger(t) => self.right_trigger = t,
            GamepadFieldUpdate::Battery(level) => self.battery = level,
        }
    }
}

/// A single semantic change to a [`GamepadState`], produced by decoding one
/// HID usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum GamepadFieldUpdate {
    /// Replace all buttons
    Buttons(Buttons),
    /// Press or release one button
    Button(Buttons, bool),
    /// Press or release one misc button
    MiscButton(MiscButtons, bool),
    /// Replace the D-pad (hat switch)
    Dpad(Dpad),
    /// Press or release one D-pad direction
    DpadButton(Dpad, bool),
    LeftStickX(i16),
    LeftStickY(i16),
    RightStickX(i16),
    RightStickY(i16),
    LeftTrigger(u8),
    RightTrigger(u8),
    Battery(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_bitwise_or() {
        let buttons = Buttons::A | Buttons::B;
        assert!(buttons.contains(Buttons::A));
        assert!(buttons.contains(Buttons::B));
        assert!(!buttons.contains(Buttons::X));
    }

    #[test]
    fn test_buttons_set_clear() {
        let mut buttons = Buttons::NONE;
        buttons.set(Buttons::A, true);
        assert!(buttons.is_pressed(Buttons::A));
        buttons.set(Buttons::A, false);
        assert!(!buttons.is_pressed(Buttons::A));
    }

    #[test]
    fn test_dpad_from_hat() {
        assert_eq!(Dpad::from_hat(Some(0)), Dpad::UP);
        assert_eq!(Dpad::from_hat(Some(3)), Dpad::DOWN | Dpad::RIGHT);
        assert_eq!(Dpad::from_hat(Some(7)), Dpad::UP | Dpad::LEFT);
        assert_eq!(Dpad::from_hat(Some(8)), Dpad::NONE);
        assert_eq!(Dpad::from_hat(None), Dpad::NONE);
    }

    #[test]
    fn test_gamepad_state_apply_update() {
        let mut state = GamepadState::neutral();
        state.apply_update(GamepadFieldUpdate::Buttons(Buttons::A | Buttons::B));
        state.apply_update(GamepadFieldUpdate::Button(Buttons::A, false));
        assert_eq!(state.buttons, Buttons::B);

        state.apply_update(GamepadFieldUpdate::MiscButton(MiscButtons::START, true));
        assert!(state.misc_buttons.is_pressed(MiscButtons::START));

        state.apply_update(GamepadFieldUpdate::DpadButton(Dpad::LEFT, true));
        assert_eq!(state.dpad, Dpad::LEFT);

        state.apply_update(GamepadFieldUpdate::LeftStickX(-1000));
        assert_eq!(state.left_stick.x, -1000);

        state.apply_update(GamepadFieldUpdate::LeftTrigger(128));
        assert_eq!(state.left_trigger, 128);
        assert!(!state.is_at_rest());
    }

    #[test]
    fn test_neutral_is_at_rest() {
        let mut state = GamepadState::neutral();
        assert!(state.is_at_rest());
        state.battery = BATTERY_FULL;
        assert!(state.is_at_rest());
        assert_eq!(GamepadState::default(), GamepadState::neutral());
    }
}
