//! Device identity, device records and the slot table.

use heapless::Vec;
use hid_proto::ReportLayout;

use crate::classify::ClassificationPolicy;
use crate::output::{Capabilities, PlayerLeds, Rumble};
use crate::types::GamepadState;
use crate::variant::{VariantKind, VariantState};

/// Largest report descriptor kept per device.
pub const MAX_DESCRIPTOR: usize = 512;

/// Opaque reference to a connection in the transport layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportHandle(pub u16);

/// Bluetooth class of device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceClass(pub u32);

impl DeviceClass {
    /// Major device class bits.
    pub const MAJOR_MASK: u32 = 0x001F00;
    /// Major and minor device class bits.
    pub const MAJOR_MINOR_MASK: u32 = 0x001FFC;
    pub const MAJOR_PERIPHERAL: u32 = 0x000500;
    pub const MINOR_JOYSTICK: u32 = 0x000004;
    pub const MINOR_GAMEPAD: u32 = 0x000008;

    #[inline]
    #[must_use]
    pub const fn matches(self, mask: u32, value: u32) -> bool {
        self.0 & mask == value
    }

    /// Whether the class announces a joystick or gamepad peripheral.
    #[must_use]
    pub const fn is_game_controller(self) -> bool {
        self.matches(
            Self::MAJOR_MINOR_MASK,
            Self::MAJOR_PERIPHERAL | Self::MINOR_JOYSTICK,
        ) || self.matches(
            Self::MAJOR_MINOR_MASK,
            Self::MAJOR_PERIPHERAL | Self::MINOR_GAMEPAD,
        )
    }
}

/// Identification signals the transport gathers for a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub handle: TransportHandle,
    pub vendor_id: u16,
    pub product_id: u16,
    pub class: DeviceClass,
    /// HID report descriptor, truncated to [`MAX_DESCRIPTOR`] bytes.
    pub descriptor: Vec<u8, MAX_DESCRIPTOR>,
}

impl DeviceIdentity {
    #[must_use]
    pub fn new(handle: TransportHandle, vendor_id: u16, product_id: u16) -> Self {
        Self {
            handle,
            vendor_id,
            product_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: DeviceClass) -> Self {
        self.class = class;
        self
    }

    #[must_use]
    pub fn with_descriptor(mut self, descriptor: &[u8]) -> Self {
        self.set_descriptor(descriptor);
        self
    }

    /// Replace the report descriptor. Bytes past [`MAX_DESCRIPTOR`] are
    /// dropped; the parser keeps what it can make of the rest.
    pub fn set_descriptor(&mut self, descriptor: &[u8]) {
        if descriptor.len() > MAX_DESCRIPTOR {
            warn!(
                "descriptor of {} bytes truncated to {}",
                descriptor.len(),
                MAX_DESCRIPTOR
            );
        }
        let len = descriptor.len().min(MAX_DESCRIPTOR);
        self.descriptor.clear();
        // Cannot fail: `len` fits the capacity
        let _ = self.descriptor.extend_from_slice(&descriptor[..len]);
    }
}

/// Everything known about the controller in one slot.
///
/// The public gamepad state is only written by the update tick; the
/// application reads it through [`Gamepads`](crate::Gamepads).
#[derive(Debug, Clone, Default)]
pub struct DeviceRecord {
    slot: usize,
    identity: DeviceIdentity,
    variant: VariantState,
    layout: ReportLayout,
    state: GamepadState,
    connected: bool,
    leds: PlayerLeds,
    rumble: Rumble,
}

impl DeviceRecord {
    /// An empty record for `slot`.
    #[must_use]
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> TransportHandle {
        self.identity.handle
    }

    #[inline]
    #[must_use]
    pub fn variant(&self) -> VariantKind {
        self.variant.kind()
    }

    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.variant.capabilities()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &GamepadState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Last player LED pattern requested.
    #[inline]
    #[must_use]
    pub fn leds(&self) -> PlayerLeds {
        self.leds
    }

    /// Last rumble requested.
    #[inline]
    #[must_use]
    pub fn rumble(&self) -> Rumble {
        self.rumble
    }

    /// Take over a new connection: derive the report layout, pick the
    /// variant and reset decoding state.
    pub(crate) fn attach(&mut self, identity: DeviceIdentity, policy: &ClassificationPolicy) {
        *self = Self::new(self.slot);
        self.layout = ReportLayout::parse_lossy(&identity.descriptor);
        let kind = policy.classify(&identity, &self.layout);
        info!(
            "slot {}: {:#x}:{:#x} classified as {:?}",
            self.slot, identity.vendor_id, identity.product_id, kind
        );
        self.variant = VariantState::new(kind);
        self.variant.identify(&identity);
        self.variant.init_report(&mut self.state);
        self.identity = identity;
    }

    /// Re-derive the report layout after the device renegotiated its
    /// descriptor. The variant stays.
    pub(crate) fn set_descriptor(&mut self, descriptor: &[u8]) {
        self.identity.set_descriptor(descriptor);
        self.layout = ReportLayout::parse_lossy(&self.identity.descriptor);
        debug!(
            "slot {}: layout re-derived, {} fields",
            self.slot,
            self.layout.fields().len()
        );
    }

    /// Fold one input report into the public state.
    pub(crate) fn decode(&mut self, report: &[u8]) {
        if self.variant.parse_raw_report(report, &mut self.state) {
            return;
        }
        let variant = &mut self.variant;
        let state = &mut self.state;
        let delivered = self.layout.for_each_input(report, |globals, usage_page, usage, value| {
            variant.parse_usage(state, globals, usage_page, usage, value);
        });
        trace!("slot {}: {} fields decoded", self.slot, delivered);
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub(crate) fn variant_mut(&mut self) -> &mut VariantState {
        &mut self.variant
    }

    pub(crate) fn record_leds(&mut self, leds: PlayerLeds) {
        self.leds = leds;
    }

    pub(crate) fn record_rumble(&mut self, rumble: Rumble) {
        self.rumble = rumble;
    }

    /// Zero the record, keeping only its slot index.
    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.slot);
    }
}

/// Fixed table of device records, indexed by slot.
#[derive(Debug, Clone)]
pub struct SlotTable<const N: usize> {
    records: [DeviceRecord; N],
}

impl<const N: usize> SlotTable<N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: core::array::from_fn(DeviceRecord::new),
        }
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&DeviceRecord> {
        self.records.get(slot)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut DeviceRecord> {
        self.records.get_mut(slot)
    }

    /// All records in slot order, connected or not.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.iter()
    }

    /// Connected records in slot order.
    pub fn connected(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.iter().filter(|r| r.connected)
    }
}

impl<const N: usize> Default for SlotTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
