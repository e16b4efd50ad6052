//! Player number assignment.

use defmt::info;
use gamepad_core::{DeviceRecord, GamepadCallbacks, PlayerLeds};

/// Connection callbacks that remember which slots still need their
/// player LEDs lit. Player numbers follow slot order.
#[derive(Default)]
pub struct PlayerAssigner {
    pending: u32,
}

impl PlayerAssigner {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: 0 }
    }

    /// Slots connected since the last call, with their LED pattern.
    pub fn take_pending(&mut self) -> impl Iterator<Item = (usize, PlayerLeds)> {
        let pending = core::mem::take(&mut self.pending);
        (0..32usize)
            .filter(move |slot| pending & (1 << slot) != 0)
            .map(|slot| (slot, PlayerLeds::player(slot as u8 + 1)))
    }
}

impl GamepadCallbacks for PlayerAssigner {
    fn on_connect(&mut self, gamepad: &DeviceRecord) {
        info!(
            "Gamepad {} connected: {:?} {:#x}:{:#x}",
            gamepad.slot(),
            gamepad.variant(),
            gamepad.identity().vendor_id,
            gamepad.identity().product_id
        );
        self.pending |= 1 << gamepad.slot();
    }

    fn on_disconnect(&mut self, gamepad: &DeviceRecord) {
        info!("Gamepad {} disconnected", gamepad.slot());
        self.pending &= !(1 << gamepad.slot());
    }
}
