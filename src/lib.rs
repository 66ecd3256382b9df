//! hid-telephony - Telephony control signal codec for HID devices
//!
//! Decodes and encodes the telephony signals (hook switch, mute, call
//! LEDs, ringer) that headsets and phones carry inside generic HID
//! reports. The device's own report descriptor is interpreted once into
//! flat offset tables; from then on inbound reports are decoded into
//! boolean events routed to subscribers, and boolean writes are packed
//! into merged, byte-aligned output reports.
//!
//! ```text
//! descriptor --> SignalTables --+--> InputRouter --> subscribers
//!                               +--> OutputCache --> DeviceHandle
//! ```

pub mod classify;
pub mod config;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod logging;
pub mod output;
pub mod report;
pub mod router;
pub mod usage;

pub use classify::ControlCategory;
pub use config::ManagerConfig;
pub use descriptor::{
    InputSignalEntry, OutputSignalEntry, ReportCollection, ReportInfo, ReportItem, SignalTables,
};
pub use device::{DeviceHandle, DeviceInfo, DeviceManager, InputReportEvent};
pub use error::{Error, Result};
pub use router::{InputRouter, SubscriptionId};
pub use usage::{InputSignal, OutputSignal};
