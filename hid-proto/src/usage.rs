//! HID usage page and usage identifiers used by gamepad decoders.
//!
//! Values follow the HID Usage Tables 1.12.

/// Usage pages.
pub mod page {
    pub const GENERIC_DESKTOP: u16 = 0x01;
    pub const SIMULATION: u16 = 0x02;
    pub const GENERIC_DEVICE_CONTROLS: u16 = 0x06;
    pub const KEYBOARD: u16 = 0x07;
    pub const LED: u16 = 0x08;
    pub const BUTTON: u16 = 0x09;
    pub const CONSUMER: u16 = 0x0C;
    /// First vendor-defined page.
    pub const VENDOR_DEFINED_START: u16 = 0xFF00;
}

/// Generic Desktop page usages.
pub mod desktop {
    pub const POINTER: u16 = 0x01;
    pub const MOUSE: u16 = 0x02;
    pub const JOYSTICK: u16 = 0x04;
    pub const GAMEPAD: u16 = 0x05;
    pub const KEYBOARD: u16 = 0x06;
    pub const MULTI_AXIS_CONTROLLER: u16 = 0x08;
    pub const X: u16 = 0x30;
    pub const Y: u16 = 0x31;
    pub const Z: u16 = 0x32;
    pub const RX: u16 = 0x33;
    pub const RY: u16 = 0x34;
    pub const RZ: u16 = 0x35;
    pub const SLIDER: u16 = 0x36;
    pub const DIAL: u16 = 0x37;
    pub const WHEEL: u16 = 0x38;
    pub const HAT_SWITCH: u16 = 0x39;
    pub const SYSTEM_MAIN_MENU: u16 = 0x85;
    pub const DPAD_UP: u16 = 0x90;
    pub const DPAD_DOWN: u16 = 0x91;
    pub const DPAD_RIGHT: u16 = 0x92;
    pub const DPAD_LEFT: u16 = 0x93;
}

/// Simulation Controls page usages.
pub mod simulation {
    pub const ACCELERATOR: u16 = 0xC4;
    pub const BRAKE: u16 = 0xC5;
}

/// Generic Device Controls page usages.
pub mod device_controls {
    pub const BATTERY_STRENGTH: u16 = 0x20;
}

/// Consumer page usages.
pub mod consumer {
    pub const MENU: u16 = 0x40;
    pub const RECORD: u16 = 0xB2;
    pub const PLAY_PAUSE: u16 = 0xCD;
    pub const AC_SEARCH: u16 = 0x221;
    pub const AC_HOME: u16 = 0x223;
    pub const AC_BACK: u16 = 0x224;
}

/// Returns true for application collections a gamepad decoder can use.
#[inline]
#[must_use]
pub const fn is_gamepad_application(usage_page: u16, usage: u16) -> bool {
    usage_page == page::GENERIC_DESKTOP
        && matches!(
            usage,
            desktop::JOYSTICK | desktop::GAMEPAD | desktop::MULTI_AXIS_CONTROLLER
        )
}
