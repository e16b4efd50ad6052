//! Output path: LED and rumble requests, and the sink variants write
//! vendor output reports to.

use heapless::Vec;

/// Largest output report a variant produces, header included.
pub const MAX_OUTPUT_REPORT: usize = 80;

/// Bluetooth HIDP transaction header for an output report (DATA | OUTPUT).
pub const HIDP_OUTPUT_HEADER: u8 = 0xA2;

/// An output report ready for the transport, starting with the HIDP header.
pub type OutputReport = Vec<u8, MAX_OUTPUT_REPORT>;

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Report dropped (transport not draining the outbox).
    Dropped,
    /// Report larger than [`MAX_OUTPUT_REPORT`].
    TooLong,
}

/// Destination for the output reports of one device.
///
/// Sending never blocks: a report that cannot be queued is dropped and
/// [`OutputError::Dropped`] returned.
pub trait OutputSink {
    /// Queue one output report. `report` starts with [`HIDP_OUTPUT_HEADER`].
    fn send(&mut self, report: &[u8]) -> Result<(), OutputError>;
}

/// Abstract player LED pattern, one bit per LED (bit 0 = player 1).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayerLeds(pub u8);

impl PlayerLeds {
    pub const OFF: Self = Self(0);

    /// Pattern lighting the LED of `player` (1-4). Other values turn all off.
    #[must_use]
    pub const fn player(player: u8) -> Self {
        match player {
            1..=4 => Self(1 << (player - 1)),
            _ => Self::OFF,
        }
    }

    /// Lowest lit LED (1-4), if any.
    #[must_use]
    pub const fn first_player(self) -> Option<u8> {
        let mask = self.0 & 0x0F;
        if mask == 0 {
            None
        } else {
            Some(mask.trailing_zeros() as u8 + 1)
        }
    }
}

/// Rumble request.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rumble {
    /// Weak (high frequency) motor strength.
    pub weak: u8,
    /// Strong (low frequency) motor strength.
    pub strong: u8,
    /// How long to rumble, for controllers that time it themselves.
    pub duration_ms: u16,
}

impl Rumble {
    pub const OFF: Self = Self {
        weak: 0,
        strong: 0,
        duration_ms: 0,
    };

    #[must_use]
    pub const fn new(weak: u8, strong: u8, duration_ms: u16) -> Self {
        Self {
            weak,
            strong,
            duration_ms,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_off(&self) -> bool {
        self.weak == 0 && self.strong == 0
    }
}

/// Static output capabilities of a controller family.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    pub player_leds: bool,
    pub rumble: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        player_leds: false,
        rumble: false,
    };
}
