//! Controller classification, report decoding and connection tracking for
//! Bluetooth gamepads.
//!
//! The crate sits between a Bluetooth HID transport and the application. It
//! has no platform dependencies and runs in `no_std` firmware as well as on
//! host for testing.
//!
//! # Overview
//!
//! - [`bus`]: slots the transport fills from its own context ([`TransportBus`])
//! - [`classify`]: picks a controller family per device ([`ClassificationPolicy`])
//! - [`variant`] and [`variants`]: per-family decoders ([`Variant`], [`VariantState`])
//! - [`decode`]: the standard HID usage to gamepad mapping
//! - [`device`]: device records and the slot table ([`DeviceRecord`])
//! - [`gamepads`]: the update tick and application API ([`Gamepads`])
//! - [`output`]: LED and rumble requests ([`PlayerLeds`], [`Rumble`])
//! - [`types`]: the normalized gamepad state ([`GamepadState`])
//!
//! # Example
//!
//! ```rust
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use gamepad_core::{Buttons, DeviceIdentity, Gamepads, TransportBus, TransportHandle};
//!
//! let descriptor = [
//!     0x05, 0x01, 0x09, 0x05, 0xA1, 0x01, // Usage Page (Generic Desktop), Usage (Gamepad)
//!     0x05, 0x09, 0x19, 0x01, 0x29, 0x08, // Buttons 1-8
//!     0x15, 0x00, 0x25, 0x01, 0x75, 0x01, 0x95, 0x08, 0x81, 0x02,
//!     0xC0,
//! ];
//! let bus: TransportBus<NoopRawMutex, 4> = TransportBus::new();
//! let mut gamepads = Gamepads::new(&bus);
//!
//! // Transport side
//! let identity = DeviceIdentity::new(TransportHandle(0x40), 0x1234, 0x0001)
//!     .with_descriptor(&descriptor);
//! let slot = bus.connect(identity).unwrap();
//! bus.submit_report(slot, &[0b0000_0001]).unwrap();
//!
//! // Application side
//! gamepads.update();
//! let pad = gamepads.gamepad(slot).unwrap();
//! assert!(pad.state().buttons.is_pressed(Buttons::A));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through `defmt` and derive `defmt::Format`
//! - **`log`**: Log through the `log` facade when `defmt` is off
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod bus;
pub mod classify;
pub mod decode;
pub mod device;
pub mod gamepads;
pub mod output;
pub mod types;
pub mod variant;
pub mod variants;

// Re-export main types at crate root
pub use bus::{OutputCommand, RawReport, SlotError, TransportBus};
pub use classify::{ClassificationPolicy, Matcher, Rule, DEFAULT_POLICY};
pub use device::{DeviceClass, DeviceIdentity, DeviceRecord, SlotTable, TransportHandle};
pub use gamepads::{Callbacks, GamepadCallbacks, Gamepads};
pub use output::{Capabilities, OutputError, OutputReport, OutputSink, PlayerLeds, Rumble};
pub use types::{
    AnalogStick, Buttons, Dpad, GamepadFieldUpdate, GamepadState, MiscButtons, StatusFlags,
};
pub use variant::{Variant, VariantKind, VariantState};
