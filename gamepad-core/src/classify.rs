//! Controller family classification.
//!
//! A [`ClassificationPolicy`] is an ordered table of [`Rule`]s; the first
//! rule whose [`Matcher`] accepts a device picks its family. Devices no rule
//! accepts fall back to [`VariantKind::GenericHid`] when the descriptor or the
//! class of device announces a game controller, and to
//! [`VariantKind::Unknown`] otherwise.

use hid_proto::usage::{consumer, page};
use hid_proto::ReportLayout;

use crate::device::DeviceIdentity;
use crate::variant::VariantKind;
use crate::variants::{NIMBUS_PRODUCT, NIMBUS_VENDOR};

pub const VENDOR_SONY: u16 = 0x054C;
pub const VENDOR_MICROSOFT: u16 = 0x045E;
pub const VENDOR_NINTENDO: u16 = 0x057E;

/// Condition a device must satisfy for a [`Rule`] to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Matcher {
    /// Exact vendor and product ID.
    VendorProduct { vendor: u16, product: u16 },
    /// Any product of a vendor.
    Vendor(u16),
    /// Class of device bits under `mask` equal `value`.
    DeviceClass { mask: u32, value: u32 },
    /// Report descriptor declares the usage.
    HasUsage { usage_page: u16, usage: u16 },
}

impl Matcher {
    #[must_use]
    pub fn matches(&self, identity: &DeviceIdentity, layout: &ReportLayout) -> bool {
        match *self {
            Self::VendorProduct { vendor, product } => {
                identity.vendor_id == vendor && identity.product_id == product
            }
            Self::Vendor(vendor) => identity.vendor_id == vendor,
            Self::DeviceClass { mask, value } => identity.class.matches(mask, value),
            Self::HasUsage { usage_page, usage } => layout.has_usage(usage_page, usage),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rule {
    pub matcher: Matcher,
    pub variant: VariantKind,
}

impl Rule {
    #[must_use]
    pub const fn new(matcher: Matcher, variant: VariantKind) -> Self {
        Self { matcher, variant }
    }

    #[must_use]
    pub const fn product(vendor: u16, product: u16, variant: VariantKind) -> Self {
        Self::new(Matcher::VendorProduct { vendor, product }, variant)
    }
}

/// Ordered classification rules. First match wins.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationPolicy {
    rules: &'static [Rule],
}

impl ClassificationPolicy {
    #[must_use]
    pub const fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    #[inline]
    #[must_use]
    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Pick the controller family of a device.
    #[must_use]
    pub fn classify(&self, identity: &DeviceIdentity, layout: &ReportLayout) -> VariantKind {
        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.matcher.matches(identity, layout))
        {
            debug!("matched rule {:?}", rule.matcher);
            return rule.variant;
        }
        if layout.is_gamepad_like() || identity.class.is_game_controller() {
            VariantKind::GenericHid
        } else {
            VariantKind::Unknown
        }
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        DEFAULT_POLICY
    }
}

const DEFAULT_RULES: &[Rule] = &[
    // DualShock 4, first and second revision, wireless adapter
    Rule::product(VENDOR_SONY, 0x05C4, VariantKind::Ps4),
    Rule::product(VENDOR_SONY, 0x09CC, VariantKind::Ps4),
    Rule::product(VENDOR_SONY, 0x0BA0, VariantKind::Ps4),
    // DualSense, DualSense Edge
    Rule::product(VENDOR_SONY, 0x0CE6, VariantKind::Ps5),
    Rule::product(VENDOR_SONY, 0x0DF2, VariantKind::Ps5),
    Rule::product(VENDOR_MICROSOFT, 0x02E0, VariantKind::Xbox),
    Rule::product(VENDOR_MICROSOFT, 0x02FD, VariantKind::Xbox),
    Rule::product(VENDOR_MICROSOFT, 0x0B05, VariantKind::Xbox),
    Rule::product(VENDOR_MICROSOFT, 0x0B13, VariantKind::Xbox),
    Rule::product(VENDOR_MICROSOFT, 0x0B20, VariantKind::Xbox),
    Rule::product(VENDOR_MICROSOFT, 0x0B22, VariantKind::Xbox),
    // Pro Controller, Joy-Con L, Joy-Con R
    Rule::product(VENDOR_NINTENDO, 0x2009, VariantKind::Switch),
    Rule::product(VENDOR_NINTENDO, 0x2006, VariantKind::Switch),
    Rule::product(VENDOR_NINTENDO, 0x2007, VariantKind::Switch),
    // Wii Remote, Wii Remote Plus
    Rule::product(VENDOR_NINTENDO, 0x0306, VariantKind::Wii),
    Rule::product(VENDOR_NINTENDO, 0x0330, VariantKind::Wii),
    // SteelSeries Nimbus, Stadia
    Rule::product(NIMBUS_VENDOR, NIMBUS_PRODUCT, VariantKind::Android),
    Rule::product(0x18D1, 0x9400, VariantKind::Android),
    // Android gamepads declare a Back key on the Consumer page
    Rule::new(
        Matcher::HasUsage {
            usage_page: page::CONSUMER,
            usage: consumer::AC_BACK,
        },
        VariantKind::Android,
    ),
    Rule::new(Matcher::Vendor(VENDOR_MICROSOFT), VariantKind::Xbox),
];

/// Built-in rules for the supported controller families.
pub const DEFAULT_POLICY: ClassificationPolicy = ClassificationPolicy::new(DEFAULT_RULES);
