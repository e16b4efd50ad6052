//! HID report descriptor parsing, field extraction and value scaling.
//!
//! This crate holds the HID-level building blocks a gamepad decoder needs,
//! independent of any controller family:
//!
//! - [`ReportLayout`]: parses a report descriptor into input fields, each with
//!   the [`HidGlobals`] in effect for it
//! - [`ReportLayout::for_each_input`]: splits an input report into
//!   `(globals, usage page, usage, value)` tuples
//! - [`scale`]: clamps and rescales raw values to axis, trigger and hat ranges
//! - [`usage`]: usage page and usage identifiers
//! - [`crc`]: CRC-32 used by vendor output reports
//!
//! # Example
//!
//! ```
//! use hid_proto::{usage::{desktop, page}, ReportLayout};
//!
//! let descriptor = [
//!     0x05, 0x01, // Usage Page (Generic Desktop)
//!     0x09, 0x30, // Usage (X)
//!     0x15, 0x00, // Logical Minimum (0)
//!     0x26, 0xFF, 0x00, // Logical Maximum (255)
//!     0x75, 0x08, // Report Size (8)
//!     0x95, 0x01, // Report Count (1)
//!     0x81, 0x02, // Input (Data, Variable, Absolute)
//! ];
//! let layout = ReportLayout::parse(&descriptor).unwrap();
//!
//! let mut x = 0;
//! layout.for_each_input(&[0xFF], |globals, usage_page, usage, value| {
//!     if usage_page == page::GENERIC_DESKTOP && usage == desktop::X {
//!         x = globals.axis(value);
//!     }
//! });
//! assert_eq!(x, 32767);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through `defmt` and derive `defmt::Format`
//! - **`log`**: Log through the `log` facade when `defmt` is off

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod crc;
pub mod descriptor;
pub mod globals;
pub mod report;
pub mod scale;
pub mod usage;

pub use crc::{calculate_crc32, Crc32Digest};
pub use descriptor::{DescriptorError, FieldKind, ReportField, ReportLayout, MAX_FIELDS};
pub use globals::HidGlobals;
pub use report::{extract_bits, sign_extend};
