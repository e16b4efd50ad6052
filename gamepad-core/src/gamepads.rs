//! Connection lifecycle and the application-facing gamepad table.
//!
//! [`Gamepads::update`] is the periodic tick. It reads the bus occupancy
//! mask, decodes the latest report of every held slot, and compares the mask
//! with the one stored at the previous tick. Every bit that changed fires one
//! callback, in ascending slot order. Connections that appear and vanish
//! between two ticks are never seen by the application.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::bus::{SlotError, TransportBus};
use crate::classify::ClassificationPolicy;
use crate::device::{DeviceRecord, SlotTable};
use crate::output::{Capabilities, PlayerLeds, Rumble};

/// Application hooks for connection changes.
///
/// `on_connect` sees the record already marked connected, with the first
/// decoded state if a report arrived before the tick. `on_disconnect` sees
/// the record still marked connected, with its last state; it is zeroed
/// right after the callback returns.
pub trait GamepadCallbacks {
    fn on_connect(&mut self, gamepad: &DeviceRecord);
    fn on_disconnect(&mut self, gamepad: &DeviceRecord);
}

/// No callbacks.
impl GamepadCallbacks for () {
    fn on_connect(&mut self, _gamepad: &DeviceRecord) {}
    fn on_disconnect(&mut self, _gamepad: &DeviceRecord) {}
}

/// Callbacks from a pair of closures.
pub struct Callbacks<C, D> {
    on_connect: C,
    on_disconnect: D,
}

impl<C, D> Callbacks<C, D>
where
    C: FnMut(&DeviceRecord),
    D: FnMut(&DeviceRecord),
{
    pub fn new(on_connect: C, on_disconnect: D) -> Self {
        Self {
            on_connect,
            on_disconnect,
        }
    }
}

impl<C, D> GamepadCallbacks for Callbacks<C, D>
where
    C: FnMut(&DeviceRecord),
    D: FnMut(&DeviceRecord),
{
    fn on_connect(&mut self, gamepad: &DeviceRecord) {
        (self.on_connect)(gamepad);
    }

    fn on_disconnect(&mut self, gamepad: &DeviceRecord) {
        (self.on_disconnect)(gamepad);
    }
}

fn slots(mask: u32) -> impl Iterator<Item = usize> {
    (0..32usize).filter(move |slot| mask & (1 << slot) != 0)
}

/// Device records fed from a [`TransportBus`].
///
/// Records and their gamepad state are only written by [`update`](Self::update)
/// and the output methods; the transport never touches them.
pub struct Gamepads<'b, M: RawMutex, H: GamepadCallbacks, const N: usize> {
    bus: &'b TransportBus<M, N>,
    records: SlotTable<N>,
    policy: ClassificationPolicy,
    callbacks: H,
    /// Occupancy mask seen at the previous tick.
    previous: u32,
}

impl<'b, M: RawMutex, const N: usize> Gamepads<'b, M, (), N> {
    /// Track `bus` with the built-in classification rules and no callbacks.
    #[must_use]
    pub fn new(bus: &'b TransportBus<M, N>) -> Self {
        Self {
            bus,
            records: SlotTable::new(),
            policy: ClassificationPolicy::default(),
            callbacks: (),
            previous: 0,
        }
    }
}

impl<'b, M: RawMutex, H: GamepadCallbacks, const N: usize> Gamepads<'b, M, H, N> {
    /// Install the connection callbacks, replacing any previous ones.
    pub fn setup<H2: GamepadCallbacks>(self, callbacks: H2) -> Gamepads<'b, M, H2, N> {
        Gamepads {
            bus: self.bus,
            records: self.records,
            policy: self.policy,
            callbacks,
            previous: self.previous,
        }
    }

    /// Classify future connections with `policy`.
    #[must_use]
    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn callbacks(&self) -> &H {
        &self.callbacks
    }

    #[inline]
    pub fn callbacks_mut(&mut self) -> &mut H {
        &mut self.callbacks
    }

    /// Run one tick: adopt new connections, decode pending reports and
    /// deliver connect/disconnect callbacks.
    pub fn update(&mut self) {
        let current = self.bus.occupancy();
        self.tick(current);
    }

    /// Tick against an occupancy mask read from the bus. The transport may
    /// have moved on since.
    fn tick(&mut self, current: u32) {
        let previous = self.previous;

        // Connections that came and went since the last tick. A slot occupied
        // when `current` was read is delivered through connect and disconnect.
        for slot in 0..N {
            let seen = (previous | current) & (1 << slot) != 0;
            if !seen && self.bus.is_released(slot) {
                debug!("slot {}: dropped before first tick", slot);
                self.bus.free(slot);
            }
        }

        for slot in slots(current & !previous) {
            self.attach(slot);
        }

        for slot in slots(current | previous) {
            self.decode(slot);
        }

        if current == previous {
            return;
        }

        for slot in slots(current ^ previous) {
            let Some(record) = self.records.get_mut(slot) else {
                continue;
            };
            if current & (1 << slot) != 0 {
                record.set_connected(true);
                info!("slot {}: {:?} connected", slot, record.variant());
                self.callbacks.on_connect(record);
            } else {
                self.callbacks.on_disconnect(record);
                info!("slot {}: {:?} disconnected", slot, record.variant());
                record.clear();
                self.bus.free(slot);
            }
        }
        self.previous = current;
    }

    fn attach(&mut self, slot: usize) {
        // Clear the dirty flag before copying: an update landing after this
        // point is picked up by `decode`.
        let _ = self.bus.take_descriptor(slot);
        let (Some(record), Some(identity)) = (self.records.get_mut(slot), self.bus.identity(slot))
        else {
            return;
        };
        record.attach(identity, &self.policy);
        let mut sink = self.bus.sink(slot, record.handle());
        if let Err(e) = record.variant_mut().setup(&mut sink) {
            warn!("slot {}: setup failed: {:?}", slot, e);
        }
    }

    fn decode(&mut self, slot: usize) {
        let Some(record) = self.records.get_mut(slot) else {
            return;
        };
        if let Some(descriptor) = self.bus.take_descriptor(slot) {
            record.set_descriptor(&descriptor);
        }
        if let Some(report) = self.bus.take_report(slot) {
            record.decode(&report);
        }
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Connected gamepad in `slot`.
    #[must_use]
    pub fn gamepad(&self, slot: usize) -> Option<&DeviceRecord> {
        self.records.get(slot).filter(|r| r.is_connected())
    }

    /// Connected gamepads in slot order.
    pub fn gamepads(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.connected()
    }

    /// Output capabilities of the gamepad in `slot`.
    pub fn capabilities(&self, slot: usize) -> Result<Capabilities, SlotError> {
        Ok(self.connected(slot)?.capabilities())
    }

    /// Light the player LEDs of the gamepad in `slot`.
    ///
    /// Succeeds without sending anything when the gamepad has no player
    /// LEDs. A report the outbox cannot take is dropped and logged.
    pub fn set_player_leds(&mut self, slot: usize, leds: PlayerLeds) -> Result<(), SlotError> {
        let bus = self.bus;
        let record = self.connected_mut(slot)?;
        record.record_leds(leds);
        let mut sink = bus.sink(slot, record.handle());
        if let Err(e) = record.variant_mut().set_player_leds(leds, &mut sink) {
            warn!("slot {}: player LEDs not sent: {:?}", slot, e);
        }
        Ok(())
    }

    /// Rumble the gamepad in `slot`. Same delivery rules as
    /// [`set_player_leds`](Self::set_player_leds).
    pub fn set_rumble(&mut self, slot: usize, rumble: Rumble) -> Result<(), SlotError> {
        let bus = self.bus;
        let record = self.connected_mut(slot)?;
        record.record_rumble(rumble);
        let mut sink = bus.sink(slot, record.handle());
        if let Err(e) = record.variant_mut().set_rumble(rumble, &mut sink) {
            warn!("slot {}: rumble not sent: {:?}", slot, e);
        }
        Ok(())
    }

    fn connected(&self, slot: usize) -> Result<&DeviceRecord, SlotError> {
        let record = self.records.get(slot).ok_or(SlotError::InvalidSlot)?;
        if record.is_connected() {
            Ok(record)
        } else {
            Err(SlotError::NotConnected)
        }
    }

    fn connected_mut(&mut self, slot: usize) -> Result<&mut DeviceRecord, SlotError> {
        let record = self.records.get_mut(slot).ok_or(SlotError::InvalidSlot)?;
        if record.is_connected() {
            Ok(record)
        } else {
            Err(SlotError::NotConnected)
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::bus::{OutputCommand, OUTBOX_DEPTH};
    use crate::device::tests::SMALL_GAMEPAD;
    use crate::device::{DeviceIdentity, TransportHandle};
    use crate::output::HIDP_OUTPUT_HEADER;
    use crate::types::{Buttons, GamepadState};
    use crate::variant::VariantKind;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use std::vec::Vec;

    type Bus = TransportBus<CriticalSectionRawMutex, 4>;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Connect(usize),
        Disconnect(usize),
    }

    #[derive(Debug, Clone, Copy)]
    struct Seen {
        event: Event,
        connected: bool,
        variant: VariantKind,
        state: GamepadState,
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Seen>,
    }

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.seen.iter().map(|s| s.event).collect()
        }
    }

    impl GamepadCallbacks for Recorder {
        fn on_connect(&mut self, gamepad: &DeviceRecord) {
            self.seen.push(Seen {
                event: Event::Connect(gamepad.slot()),
                connected: gamepad.is_connected(),
                variant: gamepad.variant(),
                state: *gamepad.state(),
            });
        }

        fn on_disconnect(&mut self, gamepad: &DeviceRecord) {
            self.seen.push(Seen {
                event: Event::Disconnect(gamepad.slot()),
                connected: gamepad.is_connected(),
                variant: gamepad.variant(),
                state: *gamepad.state(),
            });
        }
    }

    fn generic(handle: u16) -> DeviceIdentity {
        DeviceIdentity::new(TransportHandle(handle), 0x1234, 0x5678).with_descriptor(SMALL_GAMEPAD)
    }

    fn ps4(handle: u16) -> DeviceIdentity {
        DeviceIdentity::new(TransportHandle(handle), 0x054C, 0x09CC)
    }

    fn xbox(handle: u16) -> DeviceIdentity {
        DeviceIdentity::new(TransportHandle(handle), 0x045E, 0x0B13)
    }

    fn drain(bus: &Bus) -> Vec<OutputCommand> {
        core::iter::from_fn(|| bus.take_command()).collect()
    }

    #[test]
    fn test_connect_decode_disconnect() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());

        let slot = bus.connect(generic(1)).unwrap();
        bus.submit_report(slot, &[0b0000_0001, 0x80, 0x80]).unwrap();
        gamepads.update();

        let seen = &gamepads.callbacks().seen;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event, Event::Connect(0));
        assert!(seen[0].connected);
        assert_eq!(seen[0].variant, VariantKind::GenericHid);
        assert_eq!(seen[0].state.buttons, Buttons::A);

        let pad = gamepads.gamepad(0).unwrap();
        assert_eq!(pad.state().buttons, Buttons::A);
        assert_eq!(pad.handle(), TransportHandle(1));

        bus.submit_report(slot, &[0b0000_0100, 0x80, 0x80]).unwrap();
        gamepads.update();
        assert_eq!(gamepads.gamepad(0).unwrap().state().buttons, Buttons::X);
        assert_eq!(gamepads.callbacks().seen.len(), 1);

        bus.disconnect(slot).unwrap();
        gamepads.update();
        let seen = &gamepads.callbacks().seen;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].event, Event::Disconnect(0));
        assert!(seen[1].connected);
        assert_eq!(seen[1].state.buttons, Buttons::X);
        assert!(gamepads.gamepad(0).is_none());
        assert_eq!(gamepads.gamepads().count(), 0);
    }

    #[test]
    fn test_callbacks_in_ascending_slot_order() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());

        for handle in 1..=3 {
            bus.connect(generic(handle)).unwrap();
        }
        gamepads.update();
        assert_eq!(
            gamepads.callbacks().events(),
            [Event::Connect(0), Event::Connect(1), Event::Connect(2)]
        );

        // Mixed changes in one tick: slot 0 leaves, slot 3 arrives, slot 2 leaves
        bus.disconnect(2).unwrap();
        bus.connect(generic(4)).unwrap();
        bus.disconnect(0).unwrap();
        gamepads.callbacks_mut().seen.clear();
        gamepads.update();
        assert_eq!(
            gamepads.callbacks().events(),
            [Event::Disconnect(0), Event::Disconnect(2), Event::Connect(3)]
        );
        let slots: Vec<usize> = gamepads.gamepads().map(DeviceRecord::slot).collect();
        assert_eq!(slots, [1, 3]);
    }

    #[test]
    fn test_two_connects_in_one_tick() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());

        bus.connect(generic(1)).unwrap();
        bus.connect(generic(2)).unwrap();
        bus.connect(generic(3)).unwrap();
        bus.disconnect(1).unwrap();
        gamepads.update();

        assert_eq!(
            gamepads.callbacks().events(),
            [Event::Connect(0), Event::Connect(2)]
        );
        assert!(gamepads.callbacks().seen.iter().all(|s| s.connected));
    }

    #[test]
    fn test_unknown_device_stays_neutral() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());

        let slot = bus
            .connect(DeviceIdentity::new(TransportHandle(1), 0xAAAA, 0xBBBB))
            .unwrap();
        bus.submit_report(slot, &[0xFF; 16]).unwrap();
        gamepads.update();

        let seen = &gamepads.callbacks().seen;
        assert_eq!(seen[0].variant, VariantKind::Unknown);
        let pad = gamepads.gamepad(slot).unwrap();
        assert!(pad.is_connected());
        assert_eq!(*pad.state(), GamepadState::neutral());
    }

    #[test]
    fn test_full_table_rejects_connection() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());
        for handle in 1..=4 {
            bus.connect(generic(handle)).unwrap();
        }
        gamepads.update();

        assert_eq!(bus.connect(generic(5)), Err(SlotError::Exhausted));
        gamepads.update();
        assert_eq!(gamepads.callbacks().seen.len(), 4);
        let handles: Vec<u16> = gamepads.gamepads().map(|g| g.handle().0).collect();
        assert_eq!(handles, [1, 2, 3, 4]);
    }

    #[test]
    fn test_last_report_decoded_before_disconnect() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());
        let slot = bus.connect(generic(1)).unwrap();
        gamepads.update();

        bus.submit_report(slot, &[0b0000_1000, 0x80, 0x80]).unwrap();
        bus.disconnect(slot).unwrap();
        gamepads.update();

        let seen = &gamepads.callbacks().seen;
        assert_eq!(seen[1].event, Event::Disconnect(slot));
        assert_eq!(seen[1].state.buttons, Buttons::Y);
    }

    #[test]
    fn test_unchanged_tick_fires_nothing() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());
        gamepads.update();
        assert!(gamepads.callbacks().seen.is_empty());

        bus.connect(generic(1)).unwrap();
        gamepads.update();
        gamepads.update();
        gamepads.update();
        assert_eq!(gamepads.callbacks().events(), [Event::Connect(0)]);
    }

    #[test]
    fn test_connection_between_ticks_is_invisible() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());

        let slot = bus.connect(generic(1)).unwrap();
        bus.submit_report(slot, &[0xFF, 0, 0]).unwrap();
        bus.disconnect(slot).unwrap();
        gamepads.update();
        assert!(gamepads.callbacks().seen.is_empty());

        // The slot was reclaimed
        assert_eq!(bus.connect(generic(2)), Ok(0));
        gamepads.update();
        assert_eq!(gamepads.callbacks().events(), [Event::Connect(0)]);
        assert_eq!(gamepads.callbacks().seen[0].state, GamepadState::neutral());
    }

    #[test]
    fn test_slot_reused_after_disconnect_is_zeroed() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());

        let slot = bus.connect(generic(1)).unwrap();
        bus.submit_report(slot, &[0xFF, 0xFF, 0xFF]).unwrap();
        gamepads.update();
        gamepads.set_player_leds(slot, PlayerLeds::player(1)).unwrap();
        bus.disconnect(slot).unwrap();

        // Not reusable until the tick delivers the disconnect
        assert_eq!(bus.connect(xbox(2)), Ok(1));
        gamepads.update();
        assert_eq!(bus.connect(xbox(3)), Ok(0));
        gamepads.update();

        let reused = gamepads.gamepad(0).unwrap();
        assert_eq!(reused.variant(), VariantKind::Xbox);
        assert_eq!(reused.handle(), TransportHandle(3));
        assert_eq!(*reused.state(), GamepadState::neutral());
        assert_eq!(reused.leds(), PlayerLeds::OFF);
        assert!(reused.layout().fields().is_empty());
    }

    #[test]
    fn test_output_on_bad_slots() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus);
        assert_eq!(
            gamepads.set_player_leds(0, PlayerLeds::player(1)),
            Err(SlotError::NotConnected)
        );
        assert_eq!(gamepads.set_rumble(7, Rumble::OFF), Err(SlotError::InvalidSlot));
        assert_eq!(gamepads.capabilities(0), Err(SlotError::NotConnected));

        // Claimed on the bus but not yet seen by a tick
        bus.connect(ps4(1)).unwrap();
        assert_eq!(gamepads.set_rumble(0, Rumble::OFF), Err(SlotError::NotConnected));
    }

    #[test]
    fn test_ps4_output_through_outbox() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus);
        let slot = bus.connect(ps4(9)).unwrap();
        gamepads.update();
        assert_eq!(
            gamepads.capabilities(slot),
            Ok(Capabilities {
                player_leds: true,
                rumble: true
            })
        );
        assert!(drain(&bus).is_empty());

        gamepads.set_player_leds(slot, PlayerLeds::player(2)).unwrap();
        let commands = drain(&bus);
        assert_eq!(commands.len(), 1);
        let command = &commands[0];
        assert_eq!(command.slot, slot);
        assert_eq!(command.handle, TransportHandle(9));
        assert_eq!(command.report.len(), 79);
        assert_eq!(&command.report[..2], &[HIDP_OUTPUT_HEADER, 0x11]);
        let crc = hid_proto::calculate_crc32(&command.report[..75]);
        assert_eq!(&command.report[75..], &crc.to_le_bytes());
        assert_eq!(gamepads.gamepad(slot).unwrap().leds(), PlayerLeds::player(2));
    }

    #[test]
    fn test_unsupported_output_queues_nothing() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus);
        let pad = bus.connect(generic(1)).unwrap();
        let xbox_slot = bus.connect(xbox(2)).unwrap();
        gamepads.update();

        assert_eq!(gamepads.capabilities(pad), Ok(Capabilities::NONE));
        gamepads.set_player_leds(pad, PlayerLeds::player(1)).unwrap();
        gamepads.set_rumble(pad, Rumble::new(255, 255, 100)).unwrap();
        gamepads.set_player_leds(xbox_slot, PlayerLeds::player(2)).unwrap();
        assert!(drain(&bus).is_empty());

        gamepads.set_rumble(xbox_slot, Rumble::new(255, 255, 100)).unwrap();
        assert_eq!(drain(&bus).len(), 1);
    }

    #[test]
    fn test_full_outbox_is_not_an_error() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus);
        let slot = bus.connect(xbox(1)).unwrap();
        gamepads.update();

        for _ in 0..OUTBOX_DEPTH + 2 {
            assert_eq!(gamepads.set_rumble(slot, Rumble::new(10, 10, 0)), Ok(()));
        }
        assert_eq!(drain(&bus).len(), OUTBOX_DEPTH);
    }

    #[test]
    fn test_descriptor_update_rederives_layout() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus);
        let slot = bus
            .connect(DeviceIdentity::new(TransportHandle(1), 0x1234, 0x5678))
            .unwrap();
        gamepads.update();
        assert_eq!(gamepads.gamepad(slot).unwrap().variant(), VariantKind::Unknown);

        bus.update_descriptor(slot, SMALL_GAMEPAD).unwrap();
        bus.submit_report(slot, &[0b0000_0010, 0x80, 0x80]).unwrap();
        gamepads.update();

        let pad = gamepads.gamepad(slot).unwrap();
        // The family stays, the layout follows the new descriptor
        assert_eq!(pad.variant(), VariantKind::Unknown);
        assert_eq!(pad.layout().fields().len(), 10);
        assert_eq!(pad.state().buttons, Buttons::NONE);
    }

    #[test]
    fn test_disconnect_after_occupancy_read_is_still_delivered() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Recorder::default());
        let slot = bus.connect(generic(1)).unwrap();

        // The transport drops the device while the tick is running
        let current = bus.occupancy();
        bus.disconnect(slot).unwrap();
        gamepads.tick(current);
        assert_eq!(gamepads.callbacks().events(), [Event::Connect(slot)]);

        // The slot is held until its disconnect is delivered
        assert_eq!(bus.connect(xbox(2)), Ok(1));
        gamepads.update();
        assert_eq!(
            gamepads.callbacks().events(),
            [Event::Connect(0), Event::Disconnect(0), Event::Connect(1)]
        );
        let pad = gamepads.gamepad(1).unwrap();
        assert_eq!(pad.variant(), VariantKind::Xbox);
        assert_eq!(pad.handle(), TransportHandle(2));
        assert!(gamepads.gamepad(0).is_none());
    }

    #[test]
    fn test_descriptor_update_before_first_tick_is_applied() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus);
        let slot = bus
            .connect(DeviceIdentity::new(TransportHandle(1), 0x1234, 0x5678))
            .unwrap();
        bus.update_descriptor(slot, SMALL_GAMEPAD).unwrap();
        bus.submit_report(slot, &[0b0000_0001, 0x80, 0x80]).unwrap();
        gamepads.update();

        let pad = gamepads.gamepad(slot).unwrap();
        assert_eq!(pad.variant(), VariantKind::GenericHid);
        assert_eq!(pad.layout().fields().len(), 10);
        assert_eq!(pad.state().buttons, Buttons::A);
        assert!(bus.take_descriptor(slot).is_none());
    }

    #[test]
    fn test_setup_commands_queued_on_connect() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus);
        let switch = bus
            .connect(DeviceIdentity::new(TransportHandle(5), 0x057E, 0x2009))
            .unwrap();
        let wii = bus
            .connect(DeviceIdentity::new(TransportHandle(6), 0x057E, 0x0306))
            .unwrap();
        bus.connect(generic(7)).unwrap();
        gamepads.update();

        let commands = drain(&bus);
        assert_eq!(commands.len(), 2);

        assert_eq!(commands[0].slot, switch);
        assert_eq!(commands[0].handle, TransportHandle(5));
        // Subcommand 0x03: input mode 0x30
        assert_eq!(commands[0].report[0], HIDP_OUTPUT_HEADER);
        assert_eq!(&commands[0].report[11..13], &[0x03, 0x30]);

        assert_eq!(commands[1].slot, wii);
        assert_eq!(commands[1].handle, TransportHandle(6));
        assert_eq!(&commands[1].report[..], &[HIDP_OUTPUT_HEADER, 0x12, 0x00, 0x31]);

        // Nothing more on later ticks
        gamepads.update();
        assert!(drain(&bus).is_empty());
    }

    #[test]
    fn test_nimbus_player_leds_through_outbox() {
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus);
        let slot = bus
            .connect(DeviceIdentity::new(TransportHandle(3), 0x0111, 0x1420))
            .unwrap();
        gamepads.update();

        let pad = gamepads.gamepad(slot).unwrap();
        assert_eq!(pad.variant(), VariantKind::Android);
        assert_eq!(
            gamepads.capabilities(slot),
            Ok(Capabilities {
                player_leds: true,
                rumble: false
            })
        );

        gamepads.set_player_leds(slot, PlayerLeds::player(1)).unwrap();
        let commands = drain(&bus);
        assert_eq!(commands.len(), 1);
        assert_eq!(
            &commands[0].report[..],
            &[HIDP_OUTPUT_HEADER, 0x02, 0xFF, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_closure_callbacks() {
        use core::cell::Cell;

        let connects = Cell::new(0);
        let disconnects = Cell::new(0);
        let bus = Bus::new();
        let mut gamepads = Gamepads::new(&bus).setup(Callbacks::new(
            |_: &DeviceRecord| connects.set(connects.get() + 1),
            |_: &DeviceRecord| disconnects.set(disconnects.get() + 1),
        ));

        let slot = bus.connect(generic(1)).unwrap();
        gamepads.update();
        bus.disconnect(slot).unwrap();
        gamepads.update();
        assert_eq!((connects.get(), disconnects.get()), (1, 1));
    }
}
