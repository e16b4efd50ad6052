//! Controller family decoding strategies.
//!
//! Each controller family implements [`Variant`]. A device's family is fixed
//! at classification time and its decoder lives in the device record as a
//! [`VariantState`], which owns the family's private decoding state.

use hid_proto::HidGlobals;

use crate::device::DeviceIdentity;
use crate::output::{Capabilities, OutputError, OutputSink, PlayerLeds, Rumble};
use crate::types::GamepadState;
use crate::variants::{Android, GenericHid, Ps4, Ps5, Switch, Unknown, Wii, Xbox};

/// Controller family tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VariantKind {
    Android,
    Ps4,
    Ps5,
    Xbox,
    Switch,
    Wii,
    GenericHid,
    #[default]
    Unknown,
}

/// Decoding strategy of one controller family.
///
/// `Self` is the family's private decoding state. Output methods default to
/// a successful no-op, so families without LEDs or rumble implement nothing.
pub trait Variant: Default {
    const KIND: VariantKind;
    /// Outputs every model of the family supports.
    const CAPABILITIES: Capabilities = Capabilities::NONE;

    /// Record model details right after classification, before
    /// [`init_report`](Self::init_report).
    fn identify(&mut self, _identity: &DeviceIdentity) {}

    /// Outputs of this device, [`CAPABILITIES`](Self::CAPABILITIES) unless
    /// the model adds some.
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    /// Reset private and public state before the first report.
    fn init_report(&mut self, state: &mut GamepadState) {
        *self = Self::default();
        *state = GamepadState::neutral();
    }

    /// Apply one decoded HID field to `state`. Unrecognized pairs are ignored.
    fn parse_usage(
        &mut self,
        state: &mut GamepadState,
        globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    );

    /// Decode a vendor report that does not follow the report descriptor.
    ///
    /// Returns `false` to have the report walked field by field instead.
    fn parse_raw_report(&mut self, _report: &[u8], _state: &mut GamepadState) -> bool {
        false
    }

    /// Send the commands the device needs right after connecting.
    fn setup<S: OutputSink>(&mut self, _sink: &mut S) -> Result<(), OutputError> {
        Ok(())
    }

    fn set_player_leds<S: OutputSink>(
        &mut self,
        _leds: PlayerLeds,
        _sink: &mut S,
    ) -> Result<(), OutputError> {
        Ok(())
    }

    fn set_rumble<S: OutputSink>(
        &mut self,
        _rumble: Rumble,
        _sink: &mut S,
    ) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Private decoding state of a device, tagged by family.
#[derive(Debug, Clone)]
pub enum VariantState {
    Android(Android),
    Ps4(Ps4),
    Ps5(Ps5),
    Xbox(Xbox),
    Switch(Switch),
    Wii(Wii),
    GenericHid(GenericHid),
    Unknown(Unknown),
}

impl Default for VariantState {
    fn default() -> Self {
        Self::Unknown(Unknown)
    }
}

macro_rules! dispatch {
    ($self:expr, $v:ident => $e:expr) => {
        match $self {
            VariantState::Android($v) => $e,
            VariantState::Ps4($v) => $e,
            VariantState::Ps5($v) => $e,
            VariantState::Xbox($v) => $e,
            VariantState::Switch($v) => $e,
            VariantState::Wii($v) => $e,
            VariantState::GenericHid($v) => $e,
            VariantState::Unknown($v) => $e,
        }
    };
}

macro_rules! dispatch_assoc {
    ($kind:expr, $name:ident) => {
        match $kind {
            VariantKind::Android => Android::$name,
            VariantKind::Ps4 => Ps4::$name,
            VariantKind::Ps5 => Ps5::$name,
            VariantKind::Xbox => Xbox::$name,
            VariantKind::Switch => Switch::$name,
            VariantKind::Wii => Wii::$name,
            VariantKind::GenericHid => GenericHid::$name,
            VariantKind::Unknown => Unknown::$name,
        }
    };
}

impl VariantKind {
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        dispatch_assoc!(self, CAPABILITIES)
    }
}

impl VariantState {
    /// Fresh state for `kind`.
    #[must_use]
    pub fn new(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Android => Self::Android(Android::default()),
            VariantKind::Ps4 => Self::Ps4(Ps4::default()),
            VariantKind::Ps5 => Self::Ps5(Ps5::default()),
            VariantKind::Xbox => Self::Xbox(Xbox::default()),
            VariantKind::Switch => Self::Switch(Switch::default()),
            VariantKind::Wii => Self::Wii(Wii::default()),
            VariantKind::GenericHid => Self::GenericHid(GenericHid::default()),
            VariantKind::Unknown => Self::Unknown(Unknown),
        }
    }

    #[must_use]
    pub fn kind(&self) -> VariantKind {
        fn kind_of<V: Variant>(_: &V) -> VariantKind {
            V::KIND
        }
        dispatch!(self, v => kind_of(v))
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        dispatch!(self, v => v.capabilities())
    }

    pub fn identify(&mut self, identity: &DeviceIdentity) {
        dispatch!(self, v => v.identify(identity))
    }

    pub fn init_report(&mut self, state: &mut GamepadState) {
        dispatch!(self, v => v.init_report(state))
    }

    pub fn parse_usage(
        &mut self,
        state: &mut GamepadState,
        globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        dispatch!(self, v => v.parse_usage(state, globals, usage_page, usage, value))
    }

    pub fn parse_raw_report(&mut self, report: &[u8], state: &mut GamepadState) -> bool {
        dispatch!(self, v => v.parse_raw_report(report, state))
    }

    /// # Errors
    ///
    /// Returns [`OutputError`] if a setup command could not be queued.
    pub fn setup<S: OutputSink>(&mut self, sink: &mut S) -> Result<(), OutputError> {
        dispatch!(self, v => v.setup(sink))
    }

    /// # Errors
    ///
    /// Returns [`OutputError`] if the LED command could not be queued.
    pub fn set_player_leds<S: OutputSink>(
        &mut self,
        leds: PlayerLeds,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        dispatch!(self, v => v.set_player_leds(leds, sink))
    }

    /// # Errors
    ///
    /// Returns [`OutputError`] if the rumble command could not be queued.
    pub fn set_rumble<S: OutputSink>(
        &mut self,
        rumble: Rumble,
        sink: &mut S,
    ) -> Result<(), OutputError> {
        dispatch!(self, v => v.set_rumble(rumble, sink))
    }
}
