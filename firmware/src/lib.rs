//! Bluetooth gamepad hub for RP2040.
//!
//! The Bluetooth stack feeds a [`Bus`]; the tick task turns it into
//! gamepad records and hands out player numbers.

#![no_std]

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

// Re-export core types for convenience
pub use gamepad_core::{
    Buttons, DeviceIdentity, DeviceRecord, GamepadCallbacks, GamepadState, Gamepads, OutputCommand,
    PlayerLeds, Rumble, SlotError, TransportBus, TransportHandle, VariantKind,
};

pub mod players;

pub use players::PlayerAssigner;

/// Gamepads served at once.
pub const SLOTS: usize = 4;

/// Bus shared between the Bluetooth stack and the tick task.
pub type Bus = TransportBus<CriticalSectionRawMutex, SLOTS>;
