//! Usage-page/usage-id handling for the supported telephony signal set
//!
//! HID identifies every control with a two-level (usage page, usage id)
//! namespace. The transport reports usages as a combined 32-bit value with
//! the page in the high half. Only a fixed, curated set of telephony and
//! LED usages is supported; everything else is ignored by the codec.

use serde::{Deserialize, Serialize};

/// Telephony usage page (headset hook switch, mute, ringer)
pub const USAGE_PAGE_TELEPHONY: u16 = 0x000B;
/// LED usage page (indicator lamps)
pub const USAGE_PAGE_LED: u16 = 0x0008;

/// Extract the usage page from a combined 32-bit usage value
pub fn usage_page(usage: u32) -> u16 {
    (usage >> 16) as u16
}

/// Extract the usage id from a combined 32-bit usage value
pub fn usage_id(usage: u32) -> u16 {
    (usage & 0xFFFF) as u16
}

/// Combine a usage page and usage id into the 32-bit wire form
pub fn combined(page: u16, id: u16) -> u32 {
    (page as u32) << 16 | id as u32
}

/// Input signals the codec decodes from device reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSignal {
    /// TELEPHONY.HOOK_SWITCH - call accepted / call ended
    HookSwitch,
    /// TELEPHONY.PHONE_MUTE - microphone mute control
    PhoneMute,
}

impl InputSignal {
    pub const COUNT: usize = 2;
    pub const ALL: [InputSignal; Self::COUNT] = [InputSignal::HookSwitch, InputSignal::PhoneMute];

    pub fn usage_page(self) -> u16 {
        USAGE_PAGE_TELEPHONY
    }

    pub fn usage_id(self) -> u16 {
        match self {
            InputSignal::HookSwitch => 0x20,
            InputSignal::PhoneMute => 0x2F,
        }
    }

    /// Combined 32-bit usage value as it appears in descriptors
    pub fn usage(self) -> u32 {
        combined(self.usage_page(), self.usage_id())
    }

    pub fn from_usage(page: u16, id: u16) -> Option<Self> {
        match (page, id) {
            (USAGE_PAGE_TELEPHONY, 0x20) => Some(InputSignal::HookSwitch),
            (USAGE_PAGE_TELEPHONY, 0x2F) => Some(InputSignal::PhoneMute),
            _ => None,
        }
    }

    /// Signal name as string
    pub fn name(self) -> &'static str {
        match self {
            InputSignal::HookSwitch => "hook_switch",
            InputSignal::PhoneMute => "phone_mute",
        }
    }

    /// Slot in the fixed-size signal tables
    pub(crate) fn index(self) -> usize {
        match self {
            InputSignal::HookSwitch => 0,
            InputSignal::PhoneMute => 1,
        }
    }
}

/// Output signals the codec encodes into device reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSignal {
    /// LED.OFF_HOOK - active call indicator
    OffHookLed,
    /// LED.RING - incoming call indicator
    RingLed,
    /// LED.MUTE - microphone muted indicator
    MuteLed,
    /// TELEPHONY.RINGER - ringer enable
    Ringer,
}

impl OutputSignal {
    pub const COUNT: usize = 4;
    pub const ALL: [OutputSignal; Self::COUNT] = [
        OutputSignal::OffHookLed,
        OutputSignal::RingLed,
        OutputSignal::MuteLed,
        OutputSignal::Ringer,
    ];

    pub fn usage_page(self) -> u16 {
        match self {
            OutputSignal::Ringer => USAGE_PAGE_TELEPHONY,
            _ => USAGE_PAGE_LED,
        }
    }

    pub fn usage_id(self) -> u16 {
        match self {
            OutputSignal::OffHookLed => 0x17,
            OutputSignal::RingLed => 0x18,
            OutputSignal::MuteLed => 0x09,
            OutputSignal::Ringer => 0x9E,
        }
    }

    /// Combined 32-bit usage value as it appears in descriptors
    pub fn usage(self) -> u32 {
        combined(self.usage_page(), self.usage_id())
    }

    pub fn from_usage(page: u16, id: u16) -> Option<Self> {
        match (page, id) {
            (USAGE_PAGE_LED, 0x17) => Some(OutputSignal::OffHookLed),
            (USAGE_PAGE_LED, 0x18) => Some(OutputSignal::RingLed),
            (USAGE_PAGE_LED, 0x09) => Some(OutputSignal::MuteLed),
            (USAGE_PAGE_TELEPHONY, 0x9E) => Some(OutputSignal::Ringer),
            _ => None,
        }
    }

    /// Signal name as string
    pub fn name(self) -> &'static str {
        match self {
            OutputSignal::OffHookLed => "off_hook_led",
            OutputSignal::RingLed => "ring_led",
            OutputSignal::MuteLed => "mute_led",
            OutputSignal::Ringer => "ringer",
        }
    }

    /// Slot in the fixed-size signal tables
    pub(crate) fn index(self) -> usize {
        match self {
            OutputSignal::OffHookLed => 0,
            OutputSignal::RingLed => 1,
            OutputSignal::MuteLed => 2,
            OutputSignal::Ringer => 3,
        }
    }
}

fn page_name(page: u16) -> &'static str {
    match page {
        USAGE_PAGE_TELEPHONY => "TELEPHONY",
        USAGE_PAGE_LED => "LED",
        _ => "UNKNOWN",
    }
}

fn usage_name(page: u16, id: u16) -> &'static str {
    match (page, id) {
        (USAGE_PAGE_TELEPHONY, 0x20) => "HOOK_SWITCH",
        (USAGE_PAGE_TELEPHONY, 0x2F) => "PHONE_MUTE",
        (USAGE_PAGE_TELEPHONY, 0x9E) => "RINGER",
        (USAGE_PAGE_LED, 0x09) => "MUTE",
        (USAGE_PAGE_LED, 0x17) => "OFF_HOOK",
        (USAGE_PAGE_LED, 0x18) => "RING",
        _ => "UNKNOWN",
    }
}

/// Render a combined usage value for diagnostics,
/// e.g. `TELEPHONY(0x0B).HOOK_SWITCH(0x20)`
pub fn label(usage: u32) -> String {
    let page = usage_page(usage);
    let id = usage_id(usage);
    format!(
        "{}(0x{:02X}).{}(0x{:02X})",
        page_name(page),
        page,
        usage_name(page, id),
        id
    )
}
