//! Input signal decode and subscriber dispatch
//!
//! Subscribers register per input signal and are invoked in registration
//! order with the decoded boolean and the control's category, so each
//! caller can pick edge or level interpretation for itself. The router
//! never suppresses repeated states.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::classify::ControlCategory;
use crate::descriptor::SignalTables;
use crate::report;
use crate::usage::InputSignal;

/// Subscriber callback: decoded value plus the control's category
pub type InputCallback = Arc<dyn Fn(bool, ControlCategory) + Send + Sync>;

/// Opaque token identifying one subscription.
///
/// Returned by `subscribe`; stands in for callback identity when
/// unsubscribing (closures have no usable equality of their own).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Routes decoded input signals to their subscribers
pub struct InputRouter {
    tables: Arc<SignalTables>,
    /// Ordered subscriber list per signal. The lock is never held while a
    /// callback runs: dispatch snapshots the list first, so a callback may
    /// subscribe or unsubscribe mid-dispatch.
    subscribers: Mutex<[Vec<(SubscriptionId, InputCallback)>; InputSignal::COUNT]>,
    next_id: AtomicU64,
}

impl InputRouter {
    pub fn new(tables: Arc<SignalTables>) -> Self {
        Self {
            tables,
            subscribers: Mutex::new(Default::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append a subscriber for `signal`. Delivery order is registration order.
    pub fn subscribe(
        &self,
        signal: InputSignal,
        callback: impl Fn(bool, ControlCategory) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock()[signal.index()].push((id, Arc::new(callback)));
        trace!(signal = signal.name(), ?id, "subscriber added");
        id
    }

    /// Remove the subscription identified by `id`. Unknown ids are logged
    /// and ignored; future dispatches are unaffected either way.
    pub fn unsubscribe(&self, signal: InputSignal, id: SubscriptionId) {
        let mut lists = self.subscribers.lock();
        let list = &mut lists[signal.index()];
        match list.iter().position(|(sid, _)| *sid == id) {
            Some(pos) => {
                list.remove(pos);
            }
            None => warn!(
                signal = signal.name(),
                ?id,
                "unsubscribe for a callback that is not registered"
            ),
        }
    }

    /// Current number of subscribers for `signal`
    pub fn subscriber_count(&self, signal: InputSignal) -> usize {
        self.subscribers.lock()[signal.index()].len()
    }

    /// Decode every signal living in this report and notify subscribers.
    ///
    /// Returns the number of matched signals. Signals are visited in fixed
    /// table order; within one signal, callbacks fire in registration
    /// order over a snapshot taken before the first invocation, so a
    /// callback unsubscribing itself (or a sibling) cannot skip or
    /// duplicate deliveries in this dispatch.
    pub fn dispatch(&self, report_id: u8, data: &[u8]) -> usize {
        let mut matched = 0;
        for signal in InputSignal::ALL {
            let Some(entry) = self.tables.input(signal) else {
                continue;
            };
            if entry.report_id != report_id {
                continue;
            }
            matched += 1;

            let value = report::read_bit(data, entry.bit_offset);
            trace!(
                signal = signal.name(),
                value,
                category = entry.category.name(),
                "decoded input signal"
            );

            let snapshot: Vec<InputCallback> = self.subscribers.lock()[signal.index()]
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect();
            for callback in snapshot {
                callback(value, entry.category);
            }
        }
        matched
    }
}
