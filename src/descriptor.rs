//! Report descriptor interpretation
//!
//! A HID device describes its own report layout as a tree of collections,
//! each holding input and output reports made of items that pack one or
//! more usages into a bit range. This module walks that structure once, at
//! construction time, and produces the flat offset tables everything else
//! runs on: input signal -> (report id, bit offset, control category) and
//! output signal -> (report id, bit offset, report bit length).
//!
//! The walk maintains a running bit cursor per report. The cursor tracks
//! physical bit consumption, so it advances over every item whether or not
//! a supported usage matched; padding and unrelated controls still occupy
//! their declared bits.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::{classify, ControlCategory};
use crate::error::{Error, Result};
use crate::usage::{self, InputSignal, OutputSignal, USAGE_PAGE_TELEPHONY};

/// One collection of the device's self-described report layout.
///
/// Collections nest; only the first telephony collection found depth-first
/// is interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportCollection {
    pub usage_page: u16,
    pub usage: u16,
    pub input_reports: Vec<ReportInfo>,
    pub output_reports: Vec<ReportInfo>,
    pub children: Vec<ReportCollection>,
}

/// One physical report: an id plus the items packed into it, in declared order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportInfo {
    pub report_id: u8,
    pub items: Vec<ReportItem>,
}

/// One report item. Devices omit attributes freely, so everything is
/// optional; absence is handled per field (see the parse rules below).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportItem {
    /// Bits per usage in this item
    pub report_size: Option<u32>,
    /// Number of usage slots in this item
    pub report_count: Option<u32>,
    /// Combined 32-bit usage values, in slot order
    pub usages: Vec<u32>,
    pub is_absolute: Option<bool>,
    pub has_preferred_state: Option<bool>,
    pub logical_minimum: Option<i32>,
    pub logical_maximum: Option<i32>,
}

/// Where one input signal lives, and how its control behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSignalEntry {
    pub report_id: u8,
    pub bit_offset: u32,
    pub category: ControlCategory,
}

/// Where one output signal lives inside its physical report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSignalEntry {
    pub report_id: u8,
    pub bit_offset: u32,
    /// Total length of the containing report; shared by every entry with
    /// the same report id, always a multiple of 8
    pub report_bit_len: u32,
}

/// The immutable result of one descriptor parse.
///
/// Built exactly once before any input or output operation; read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct SignalTables {
    inputs: [Option<InputSignalEntry>; InputSignal::COUNT],
    outputs: [Option<OutputSignalEntry>; OutputSignal::COUNT],
}

impl SignalTables {
    /// Walk the device's collections and build both offset tables.
    ///
    /// Fails only when the device exposes no collections at all or none of
    /// them is a telephony collection; malformed items inside the telephony
    /// collection degrade to unsupported signals instead.
    pub fn parse(collections: &[ReportCollection]) -> Result<Self> {
        if collections.is_empty() {
            return Err(Error::NoCollections);
        }
        let telephony =
            find_telephony(collections).ok_or(Error::NoTelephonyCollection)?;

        let mut tables = Self::default();
        for report in &telephony.input_reports {
            tables.scan_input_report(report);
        }
        for report in &telephony.output_reports {
            tables.scan_output_report(report);
        }

        debug!(
            inputs = tables.inputs().count(),
            outputs = tables.outputs().count(),
            "signal tables built"
        );
        Ok(tables)
    }

    pub fn input(&self, signal: InputSignal) -> Option<InputSignalEntry> {
        self.inputs[signal.index()]
    }

    pub fn output(&self, signal: OutputSignal) -> Option<OutputSignalEntry> {
        self.outputs[signal.index()]
    }

    /// Supported input signals with their entries, in fixed signal order
    pub fn inputs(&self) -> impl Iterator<Item = (InputSignal, InputSignalEntry)> + '_ {
        InputSignal::ALL
            .into_iter()
            .filter_map(|signal| self.inputs[signal.index()].map(|entry| (signal, entry)))
    }

    /// Supported output signals with their entries, in fixed signal order
    pub fn outputs(&self) -> impl Iterator<Item = (OutputSignal, OutputSignalEntry)> + '_ {
        OutputSignal::ALL
            .into_iter()
            .filter_map(|signal| self.outputs[signal.index()].map(|entry| (signal, entry)))
    }

    fn scan_input_report(&mut self, report: &ReportInfo) {
        let mut cursor: u32 = 0;
        for item in &report.items {
            let size = item.report_size.unwrap_or(0);
            let count = item.report_count.unwrap_or(0);

            // An item without a size has no computable offsets; its usages
            // stay unsupported and it consumes no known bits.
            if size > 0 {
                for (slot, &combined) in item.usages.iter().enumerate() {
                    let page = usage::usage_page(combined);
                    let id = usage::usage_id(combined);
                    let Some(signal) = InputSignal::from_usage(page, id) else {
                        continue;
                    };
                    let entry = InputSignalEntry {
                        report_id: report.report_id,
                        bit_offset: cursor + slot as u32 * size,
                        category: classify(
                            item.is_absolute,
                            item.has_preferred_state,
                            item.logical_minimum,
                            item.logical_maximum,
                        ),
                    };
                    // Duplicate declarations resolve last-write-wins.
                    if self.inputs[signal.index()].replace(entry).is_some() {
                        debug!(
                            signal = signal.name(),
                            report_id = report.report_id,
                            bit_offset = entry.bit_offset,
                            "input usage declared twice, keeping later declaration"
                        );
                    }
                }
            }
            cursor += count * size;
        }
    }

    fn scan_output_report(&mut self, report: &ReportInfo) {
        let mut cursor: u32 = 0;
        let mut found: Vec<(OutputSignal, u32)> = Vec::new();

        for item in &report.items {
            // Output registration is all-or-nothing per report: one item
            // without size/count makes every offset after it unknowable.
            let (Some(size), Some(count)) = (item.report_size, item.report_count) else {
                warn!(
                    report_id = report.report_id,
                    "output report item missing size or count, report unsupported"
                );
                return;
            };
            for (slot, &combined) in item.usages.iter().enumerate() {
                let page = usage::usage_page(combined);
                let id = usage::usage_id(combined);
                if let Some(signal) = OutputSignal::from_usage(page, id) {
                    found.push((signal, cursor + slot as u32 * size));
                }
            }
            cursor += count * size;
        }

        if found.is_empty() {
            return;
        }
        if cursor % 8 != 0 {
            warn!(
                report_id = report.report_id,
                bit_len = cursor,
                "output report is not byte aligned, report unsupported"
            );
            return;
        }
        for (signal, bit_offset) in found {
            self.outputs[signal.index()] = Some(OutputSignalEntry {
                report_id: report.report_id,
                bit_offset,
                report_bit_len: cursor,
            });
        }
    }
}

fn find_telephony(collections: &[ReportCollection]) -> Option<&ReportCollection> {
    for collection in collections {
        if collection.usage_page == USAGE_PAGE_TELEPHONY {
            return Some(collection);
        }
        if let Some(found) = find_telephony(&collection.children) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::combined;

    fn bit_item(usages: Vec<u32>, count: u32) -> ReportItem {
        ReportItem {
            report_size: Some(1),
            report_count: Some(count),
            usages,
            is_absolute: Some(true),
            has_preferred_state: Some(false),
            logical_minimum: Some(0),
            logical_maximum: Some(1),
        }
    }

    fn telephony_collection(
        input_reports: Vec<ReportInfo>,
        output_reports: Vec<ReportInfo>,
    ) -> ReportCollection {
        ReportCollection {
            usage_page: USAGE_PAGE_TELEPHONY,
            usage: 0x05, // Headset
            input_reports,
            output_reports,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_collections() {
        assert!(matches!(
            SignalTables::parse(&[]),
            Err(Error::NoCollections)
        ));
    }

    #[test]
    fn test_no_telephony_collection() {
        let consumer = ReportCollection {
            usage_page: 0x000C,
            ..Default::default()
        };
        assert!(matches!(
            SignalTables::parse(&[consumer]),
            Err(Error::NoTelephonyCollection)
        ));
    }

    #[test]
    fn test_telephony_collection_found_in_children() {
        let wrapper = ReportCollection {
            usage_page: 0x000C,
            children: vec![telephony_collection(
                vec![ReportInfo {
                    report_id: 2,
                    items: vec![bit_item(vec![InputSignal::HookSwitch.usage()], 1)],
                }],
                vec![],
            )],
            ..Default::default()
        };
        let tables = SignalTables::parse(&[wrapper]).unwrap();
        assert!(tables.input(InputSignal::HookSwitch).is_some());
    }

    #[test]
    fn test_input_offsets_and_category() {
        // 8-bit input report: hook switch at bit 0, mute at bit 1
        let report = ReportInfo {
            report_id: 2,
            items: vec![
                bit_item(
                    vec![
                        InputSignal::HookSwitch.usage(),
                        InputSignal::PhoneMute.usage(),
                    ],
                    2,
                ),
                // 6 bits of padding, no usages
                ReportItem {
                    report_size: Some(1),
                    report_count: Some(6),
                    ..Default::default()
                },
            ],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![report], vec![])]).unwrap();

        let hook = tables.input(InputSignal::HookSwitch).unwrap();
        assert_eq!(hook.report_id, 2);
        assert_eq!(hook.bit_offset, 0);
        assert_eq!(hook.category, ControlCategory::ToggleSwitch);

        let mute = tables.input(InputSignal::PhoneMute).unwrap();
        assert_eq!(mute.bit_offset, 1);
    }

    #[test]
    fn test_cursor_advances_over_unmatched_items() {
        // An unrelated 8-bit volume field precedes the hook switch
        let report = ReportInfo {
            report_id: 1,
            items: vec![
                ReportItem {
                    report_size: Some(8),
                    report_count: Some(1),
                    usages: vec![combined(0x000C, 0xE0)], // CONSUMER.VOLUME
                    is_absolute: Some(true),
                    has_preferred_state: Some(false),
                    logical_minimum: Some(0),
                    logical_maximum: Some(100),
                },
                bit_item(vec![InputSignal::HookSwitch.usage()], 1),
            ],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![report], vec![])]).unwrap();
        assert_eq!(tables.input(InputSignal::HookSwitch).unwrap().bit_offset, 8);
    }

    #[test]
    fn test_duplicate_input_usage_last_write_wins() {
        let report = ReportInfo {
            report_id: 3,
            items: vec![
                bit_item(vec![InputSignal::HookSwitch.usage()], 1),
                ReportItem {
                    report_size: Some(1),
                    report_count: Some(1),
                    usages: vec![InputSignal::HookSwitch.usage()],
                    is_absolute: Some(false),
                    has_preferred_state: Some(true),
                    logical_minimum: Some(0),
                    logical_maximum: Some(1),
                },
            ],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![report], vec![])]).unwrap();

        let entry = tables.input(InputSignal::HookSwitch).unwrap();
        assert_eq!(entry.bit_offset, 1);
        assert_eq!(entry.category, ControlCategory::ToggleButton);
    }

    #[test]
    fn test_input_item_missing_size_degrades() {
        let report = ReportInfo {
            report_id: 2,
            items: vec![ReportItem {
                report_count: Some(1),
                usages: vec![InputSignal::PhoneMute.usage()],
                ..Default::default()
            }],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![report], vec![])]).unwrap();
        assert!(tables.input(InputSignal::PhoneMute).is_none());
    }

    #[test]
    fn test_button_page_usage_ignored() {
        let report = ReportInfo {
            report_id: 2,
            items: vec![bit_item(vec![combined(0x0009, 0x01)], 1)],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![report], vec![])]).unwrap();
        assert_eq!(tables.inputs().count(), 0);
    }

    #[test]
    fn test_output_offsets_share_report_len() {
        // 8-bit output report: mute@0, off-hook@1, ring@2, 5 bits padding
        let report = ReportInfo {
            report_id: 1,
            items: vec![
                bit_item(
                    vec![
                        OutputSignal::MuteLed.usage(),
                        OutputSignal::OffHookLed.usage(),
                        OutputSignal::RingLed.usage(),
                    ],
                    3,
                ),
                ReportItem {
                    report_size: Some(1),
                    report_count: Some(5),
                    ..Default::default()
                },
            ],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![], vec![report])]).unwrap();

        for (signal, offset) in [
            (OutputSignal::MuteLed, 0),
            (OutputSignal::OffHookLed, 1),
            (OutputSignal::RingLed, 2),
        ] {
            let entry = tables.output(signal).unwrap();
            assert_eq!(entry.report_id, 1);
            assert_eq!(entry.bit_offset, offset);
            assert_eq!(entry.report_bit_len, 8);
        }
        assert!(tables.output(OutputSignal::Ringer).is_none());
    }

    #[test]
    fn test_output_report_all_or_nothing() {
        // The ring LED is declared before the malformed item, but the whole
        // report must be discarded.
        let report = ReportInfo {
            report_id: 1,
            items: vec![
                bit_item(vec![OutputSignal::RingLed.usage()], 1),
                ReportItem {
                    report_count: Some(7),
                    usages: vec![OutputSignal::MuteLed.usage()],
                    ..Default::default()
                },
            ],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![], vec![report])]).unwrap();
        assert_eq!(tables.outputs().count(), 0);
    }

    #[test]
    fn test_output_report_unaligned_rejected() {
        // 3 bits total, no padding: not byte aligned
        let report = ReportInfo {
            report_id: 1,
            items: vec![bit_item(
                vec![
                    OutputSignal::MuteLed.usage(),
                    OutputSignal::OffHookLed.usage(),
                    OutputSignal::RingLed.usage(),
                ],
                3,
            )],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![], vec![report])]).unwrap();
        assert_eq!(tables.outputs().count(), 0);
    }

    #[test]
    fn test_malformed_output_does_not_affect_other_report() {
        let good = ReportInfo {
            report_id: 4,
            items: vec![
                bit_item(vec![OutputSignal::Ringer.usage()], 1),
                ReportItem {
                    report_size: Some(1),
                    report_count: Some(7),
                    ..Default::default()
                },
            ],
        };
        let bad = ReportInfo {
            report_id: 5,
            items: vec![ReportItem {
                usages: vec![OutputSignal::MuteLed.usage()],
                ..Default::default()
            }],
        };
        let tables =
            SignalTables::parse(&[telephony_collection(vec![], vec![bad, good])]).unwrap();
        assert!(tables.output(OutputSignal::Ringer).is_some());
        assert!(tables.output(OutputSignal::MuteLed).is_none());
    }

    #[test]
    fn test_parse_from_json_fixture() {
        // Descriptor as the transport layer would serialize it
        let json = format!(
            r#"[{{
                "usage_page": 11,
                "usage": 5,
                "input_reports": [{{
                    "report_id": 2,
                    "items": [{{
                        "report_size": 1,
                        "report_count": 1,
                        "usages": [{hook}],
                        "is_absolute": true,
                        "has_preferred_state": false,
                        "logical_minimum": 0,
                        "logical_maximum": 1
                    }}]
                }}],
                "output_reports": [{{
                    "report_id": 3,
                    "items": [{{
                        "report_size": 1,
                        "report_count": 8,
                        "usages": [{mute_led}]
                    }}]
                }}]
            }}]"#,
            hook = InputSignal::HookSwitch.usage(),
            mute_led = OutputSignal::MuteLed.usage(),
        );
        let collections: Vec<ReportCollection> = serde_json::from_str(&json).unwrap();
        let tables = SignalTables::parse(&collections).unwrap();

        let hook = tables.input(InputSignal::HookSwitch).unwrap();
        assert_eq!(hook.report_id, 2);
        assert_eq!(hook.category, ControlCategory::ToggleSwitch);

        let mute = tables.output(OutputSignal::MuteLed).unwrap();
        assert_eq!(mute.report_id, 3);
        assert_eq!(mute.report_bit_len, 8);
    }
}
