//! Hand-off between the transport context and the update tick.
//!
//! The transport owns connections and calls [`TransportBus::connect`],
//! [`TransportBus::submit_report`] and [`TransportBus::disconnect`] from its
//! own context. The update tick only reads what the bus publishes, so the two
//! never share a device record.
//!
//! Each slot moves through `Free -> Claimed -> Occupied -> Released -> Free`.
//! Only the tick returns a slot to `Free`, after the disconnect has been
//! observed, so a slot is never reused under a pending disconnect.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::device::{DeviceIdentity, TransportHandle, MAX_DESCRIPTOR};
use crate::output::{OutputError, OutputReport, OutputSink};

/// Largest input report accepted from the transport.
pub const MAX_INPUT_REPORT: usize = 128;

/// Output reports queued for the transport across all slots.
pub const OUTBOX_DEPTH: usize = 8;

/// Slot count limit; occupancy is tracked in a 32-bit mask.
pub const MAX_SLOTS: usize = 32;

/// One input report, without the HIDP transaction header.
pub type RawReport = Vec<u8, MAX_INPUT_REPORT>;

const FREE: u8 = 0;
const CLAIMED: u8 = 1;
const OCCUPIED: u8 = 2;
const RELEASED: u8 = 3;

/// Error type for transport-facing and application-facing slot operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotError {
    /// Every slot is taken.
    Exhausted,
    /// Slot index out of range.
    InvalidSlot,
    /// Slot holds no connected device.
    NotConnected,
    /// Input report larger than [`MAX_INPUT_REPORT`].
    ReportTooLong,
}

/// Output report addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCommand {
    pub slot: usize,
    pub handle: TransportHandle,
    /// Report starting with the HIDP output header.
    pub report: OutputReport,
}

struct BusSlot<M: RawMutex> {
    state: AtomicU8,
    identity: Mutex<M, RefCell<DeviceIdentity>>,
    report: Signal<M, RawReport>,
    descriptor_dirty: AtomicBool,
}

impl<M: RawMutex> BusSlot<M> {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(FREE),
            identity: Mutex::new(RefCell::new(DeviceIdentity::default())),
            report: Signal::new(),
            descriptor_dirty: AtomicBool::new(false),
        }
    }

    fn is(&self, state: u8) -> bool {
        self.state.load(Ordering::Acquire) == state
    }
}

/// Slots shared between the transport and [`Gamepads`](crate::Gamepads).
///
/// `M` picks the mutex guarding identities and reports: a
/// `CriticalSectionRawMutex` when the transport runs in an interrupt, a
/// `ThreadModeRawMutex` or `NoopRawMutex` when it shares the executor.
pub struct TransportBus<M: RawMutex, const N: usize> {
    slots: [BusSlot<M>; N],
    outbox: Channel<M, OutputCommand, OUTBOX_DEPTH>,
}

impl<M: RawMutex, const N: usize> TransportBus<M, N> {
    const VALID_SIZE: () = assert!(N > 0 && N <= MAX_SLOTS, "slot count must be 1..=32");

    #[must_use]
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_SIZE;
        Self {
            slots: core::array::from_fn(|_| BusSlot::new()),
            outbox: Channel::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Claim the lowest free slot for a new connection.
    ///
    /// The device becomes visible to the next update tick, which classifies
    /// it and fires the connect callback.
    pub fn connect(&self, identity: DeviceIdentity) -> Result<usize, SlotError> {
        for (index, slot) in self.slots.iter().enumerate() {
            if slot
                .state
                .compare_exchange(FREE, CLAIMED, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                continue;
            }
            let handle = identity.handle;
            slot.identity.lock(|cell| *cell.borrow_mut() = identity);
            slot.report.reset();
            slot.descriptor_dirty.store(false, Ordering::Relaxed);
            slot.state.store(OCCUPIED, Ordering::Release);
            debug!("bus: handle {} claimed slot {}", handle.0, index);
            return Ok(index);
        }
        warn!("bus: no free slot for handle {}", identity.handle.0);
        Err(SlotError::Exhausted)
    }

    /// Publish the latest input report of a slot, replacing any report the
    /// tick has not consumed yet.
    pub fn submit_report(&self, slot: usize, report: &[u8]) -> Result<(), SlotError> {
        let bus_slot = self.occupied(slot)?;
        let raw = RawReport::from_slice(report).map_err(|_| SlotError::ReportTooLong)?;
        bus_slot.report.signal(raw);
        Ok(())
    }

    /// Replace the report descriptor of a connected device. The tick
    /// re-derives the report layout before decoding the next report.
    pub fn update_descriptor(&self, slot: usize, descriptor: &[u8]) -> Result<(), SlotError> {
        let bus_slot = self.occupied(slot)?;
        bus_slot
            .identity
            .lock(|cell| cell.borrow_mut().set_descriptor(descriptor));
        bus_slot.descriptor_dirty.store(true, Ordering::Release);
        Ok(())
    }

    /// Mark a connection as gone. The next tick fires the disconnect
    /// callback and frees the slot.
    pub fn disconnect(&self, slot: usize) -> Result<(), SlotError> {
        let bus_slot = self.slots.get(slot).ok_or(SlotError::InvalidSlot)?;
        bus_slot
            .state
            .compare_exchange(OCCUPIED, RELEASED, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SlotError::NotConnected)?;
        debug!("bus: slot {} released", slot);
        Ok(())
    }

    /// Slot of the occupied connection with `handle`, if any.
    #[must_use]
    pub fn slot_of(&self, handle: TransportHandle) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.is(OCCUPIED) && slot.identity.lock(|cell| cell.borrow().handle == handle)
        })
    }

    /// Next queued output report, if any.
    pub fn take_command(&self) -> Option<OutputCommand> {
        self.outbox.try_receive().ok()
    }

    /// Wait for the next queued output report.
    pub async fn command(&self) -> OutputCommand {
        self.outbox.receive().await
    }

    fn occupied(&self, slot: usize) -> Result<&BusSlot<M>, SlotError> {
        let bus_slot = self.slots.get(slot).ok_or(SlotError::InvalidSlot)?;
        if bus_slot.is(OCCUPIED) {
            Ok(bus_slot)
        } else {
            Err(SlotError::NotConnected)
        }
    }

    /// Bit `i` set when slot `i` holds a live connection.
    pub(crate) fn occupancy(&self) -> u32 {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is(OCCUPIED))
            .fold(0, |mask, (index, _)| mask | (1 << index))
    }

    pub(crate) fn is_released(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.is(RELEASED))
    }

    pub(crate) fn identity(&self, slot: usize) -> Option<DeviceIdentity> {
        let bus_slot = self.slots.get(slot)?;
        Some(bus_slot.identity.lock(|cell| cell.borrow().clone()))
    }

    pub(crate) fn take_report(&self, slot: usize) -> Option<RawReport> {
        self.slots.get(slot)?.report.try_take()
    }

    /// Renegotiated descriptor, if one arrived since the last call.
    pub(crate) fn take_descriptor(&self, slot: usize) -> Option<Vec<u8, MAX_DESCRIPTOR>> {
        let bus_slot = self.slots.get(slot)?;
        if !bus_slot.descriptor_dirty.swap(false, Ordering::AcqRel) {
            return None;
        }
        Some(bus_slot.identity.lock(|cell| cell.borrow().descriptor.clone()))
    }

    /// Return a released slot to the pool.
    pub(crate) fn free(&self, slot: usize) {
        let Some(bus_slot) = self.slots.get(slot) else {
            return;
        };
        if bus_slot
            .state
            .compare_exchange(RELEASED, FREE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            bus_slot.report.reset();
            bus_slot.descriptor_dirty.store(false, Ordering::Relaxed);
            bus_slot
                .identity
                .lock(|cell| *cell.borrow_mut() = DeviceIdentity::default());
        }
    }

    pub(crate) fn sink(&self, slot: usize, handle: TransportHandle) -> SlotSink<'_, M, N> {
        SlotSink {
            bus: self,
            slot,
            handle,
        }
    }
}

impl<M: RawMutex, const N: usize> Default for TransportBus<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// [`OutputSink`] queuing reports for one connection on the bus outbox.
pub(crate) struct SlotSink<'a, M: RawMutex, const N: usize> {
    bus: &'a TransportBus<M, N>,
    slot: usize,
    handle: TransportHandle,
}

impl<M: RawMutex, const N: usize> OutputSink for SlotSink<'_, M, N> {
    fn send(&mut self, report: &[u8]) -> Result<(), OutputError> {
        let report = OutputReport::from_slice(report).map_err(|_| OutputError::TooLong)?;
        let command = OutputCommand {
            slot: self.slot,
            handle: self.handle,
            report,
        };
        self.bus.outbox.try_send(command).map_err(|_| {
            warn!("bus: outbox full, dropping report for slot {}", self.slot);
            OutputError::Dropped
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    type Bus = TransportBus<CriticalSectionRawMutex, 4>;

    fn identity(handle: u16) -> DeviceIdentity {
        DeviceIdentity::new(TransportHandle(handle), 0x1234, 0x5678)
    }

    #[test]
    fn test_connect_claims_lowest_free_slot() {
        let bus = Bus::new();
        assert_eq!(bus.connect(identity(10)), Ok(0));
        assert_eq!(bus.connect(identity(11)), Ok(1));
        assert_eq!(bus.connect(identity(12)), Ok(2));
        assert_eq!(bus.occupancy(), 0b0111);

        bus.disconnect(1).unwrap();
        assert_eq!(bus.occupancy(), 0b0101);
        // Released but not yet freed by a tick
        assert_eq!(bus.connect(identity(13)), Ok(3));
        assert_eq!(bus.connect(identity(14)), Err(SlotError::Exhausted));

        bus.free(1);
        assert_eq!(bus.connect(identity(15)), Ok(1));
        assert_eq!(bus.identity(1).map(|id| id.handle), Some(TransportHandle(15)));
    }

    #[test]
    fn test_latest_report_wins() {
        let bus = Bus::new();
        let slot = bus.connect(identity(1)).unwrap();
        bus.submit_report(slot, &[1, 2, 3]).unwrap();
        bus.submit_report(slot, &[4, 5]).unwrap();

        assert_eq!(bus.take_report(slot).as_deref(), Some(&[4u8, 5][..]));
        assert_eq!(bus.take_report(slot), None);
    }

    #[test]
    fn test_operations_on_bad_slots() {
        let bus = Bus::new();
        assert_eq!(bus.submit_report(0, &[1]), Err(SlotError::NotConnected));
        assert_eq!(bus.submit_report(9, &[1]), Err(SlotError::InvalidSlot));
        assert_eq!(bus.disconnect(0), Err(SlotError::NotConnected));
        assert_eq!(bus.disconnect(4), Err(SlotError::InvalidSlot));

        let slot = bus.connect(identity(1)).unwrap();
        let oversized = [0u8; MAX_INPUT_REPORT + 1];
        assert_eq!(bus.submit_report(slot, &oversized), Err(SlotError::ReportTooLong));

        bus.disconnect(slot).unwrap();
        assert_eq!(bus.disconnect(slot), Err(SlotError::NotConnected));
        assert_eq!(bus.submit_report(slot, &[1]), Err(SlotError::NotConnected));
    }

    #[test]
    fn test_descriptor_update_is_taken_once() {
        let bus = Bus::new();
        let slot = bus.connect(identity(1).with_descriptor(&[0x05, 0x01])).unwrap();
        assert_eq!(bus.take_descriptor(slot), None);

        bus.update_descriptor(slot, &[0x05, 0x09]).unwrap();
        assert_eq!(bus.take_descriptor(slot).as_deref(), Some(&[0x05u8, 0x09][..]));
        assert_eq!(bus.take_descriptor(slot), None);
    }

    #[test]
    fn test_slot_of_handle() {
        let bus = Bus::new();
        bus.connect(identity(7)).unwrap();
        let slot = bus.connect(identity(8)).unwrap();
        assert_eq!(bus.slot_of(TransportHandle(8)), Some(slot));
        bus.disconnect(slot).unwrap();
        assert_eq!(bus.slot_of(TransportHandle(8)), None);
    }

    #[test]
    fn test_free_clears_slot() {
        let bus = Bus::new();
        let slot = bus.connect(identity(3)).unwrap();
        bus.submit_report(slot, &[1]).unwrap();
        // Only released slots are freed
        bus.free(slot);
        assert_eq!(bus.occupancy(), 0b0001);

        bus.disconnect(slot).unwrap();
        assert!(bus.is_released(slot));
        bus.free(slot);
        assert!(!bus.is_released(slot));
        assert_eq!(bus.take_report(slot), None);
        assert_eq!(bus.identity(slot), Some(DeviceIdentity::default()));
    }

    #[test]
    fn test_outbox_full_drops() {
        let bus = Bus::new();
        let mut sink = bus.sink(2, TransportHandle(5));
        for _ in 0..OUTBOX_DEPTH {
            sink.send(&[0xA2, 0x01]).unwrap();
        }
        assert_eq!(sink.send(&[0xA2, 0x02]), Err(OutputError::Dropped));

        let command = bus.take_command().unwrap();
        assert_eq!(command.slot, 2);
        assert_eq!(command.handle, TransportHandle(5));
        assert_eq!(&command.report[..], &[0xA2, 0x01]);
    }

    #[test]
    fn test_oversized_output_rejected() {
        let bus = Bus::new();
        let mut sink = bus.sink(0, TransportHandle(1));
        assert_eq!(sink.send(&[0u8; 81]), Err(OutputError::TooLong));
        assert!(bus.take_command().is_none());
    }
}
