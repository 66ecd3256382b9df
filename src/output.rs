//! Output state cache and merged report building
//!
//! Several independent signals are routinely packed into one physical
//! output report (a MUTE LED and an OFF_HOOK LED sharing a byte, say). A
//! write naming only one of them must not erase a sibling's state, so the
//! report bytes are rebuilt from the full cached state of every signal in
//! that report on every send, never from only the signals being written.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::descriptor::SignalTables;
use crate::error::{Error, Result};
use crate::report;
use crate::usage::OutputSignal;

/// Last-applied state per output signal, plus the report builder
pub struct OutputCache {
    tables: Arc<SignalTables>,
    /// Mutated only by `apply`, read only by `state`; single-writer by
    /// construction (the device manager owns the sole reference)
    states: Mutex<[bool; OutputSignal::COUNT]>,
}

impl OutputCache {
    pub fn new(tables: Arc<SignalTables>) -> Self {
        Self {
            tables,
            states: Mutex::new([false; OutputSignal::COUNT]),
        }
    }

    /// Whether the descriptor declared this signal at all
    pub fn support(&self, signal: OutputSignal) -> bool {
        self.tables.output(signal).is_some()
    }

    /// Last value applied for this signal (defaults to false). Whether the
    /// value is currently *valid* is gated by the device-open state, which
    /// the owning manager checks; the cache itself never forgets.
    pub fn state(&self, signal: OutputSignal) -> bool {
        self.states.lock()[signal.index()]
    }

    /// Record the writes and build the physical reports to transmit.
    ///
    /// The cache is updated for every named signal whether or not the
    /// device supports it or is open. One report is built per distinct
    /// report id touched by a supported write, in ascending id order, each
    /// carrying the merged state of every signal in that report.
    pub fn apply(&self, writes: &[(OutputSignal, bool)]) -> Result<Vec<(u8, Vec<u8>)>> {
        let mut states = self.states.lock();
        let mut touched: BTreeMap<u8, u32> = BTreeMap::new();

        for &(signal, value) in writes {
            states[signal.index()] = value;
            match self.tables.output(signal) {
                Some(entry) => {
                    touched.insert(entry.report_id, entry.report_bit_len);
                }
                None => debug!(
                    signal = signal.name(),
                    "write to unsupported output signal cached only"
                ),
            }
        }

        let mut reports = Vec::with_capacity(touched.len());
        for (report_id, bit_len) in touched {
            // The parser rejects unaligned reports; this is the encode-time
            // backstop against silent truncation.
            if bit_len % 8 != 0 {
                return Err(Error::UnalignedReport { report_id, bit_len });
            }
            let mut data = report::zeroed_buffer(bit_len);
            for (signal, entry) in self.tables.outputs() {
                if entry.report_id == report_id && states[signal.index()] {
                    report::write_bit(&mut data, entry.bit_offset, true);
                }
            }
            reports.push((report_id, data));
        }
        Ok(reports)
    }
}
