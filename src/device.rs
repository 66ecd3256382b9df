//! Device façade
//!
//! `DeviceManager` ties one transport handle to the parsed signal tables,
//! the input router and the output cache, and exposes the public
//! operations. The transport itself (discovery, permissions, raw I/O) is
//! an external collaborator behind the `DeviceHandle` trait.
//!
//! ```text
//! device reports --> on_input_report --> InputRouter --> subscribers
//! send(writes)   --> OutputCache (merge) --> handle.send_report
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::classify::ControlCategory;
use crate::config::ManagerConfig;
use crate::descriptor::{ReportCollection, SignalTables};
use crate::error::Result;
use crate::output::OutputCache;
use crate::router::{InputRouter, SubscriptionId};
use crate::usage::{InputSignal, OutputSignal};

/// One raw inbound report from the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputReportEvent {
    pub report_id: u8,
    pub data: Vec<u8>,
}

/// Transport handle supplied by the surrounding runtime.
///
/// Assumed already permission-granted and addressable; the manager holds
/// it exclusively for its lifetime.
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    fn product_name(&self) -> String;

    fn is_opened(&self) -> bool;

    async fn open(&self) -> Result<()>;

    async fn close(&self) -> Result<()>;

    /// The device's self-described report layout
    fn collections(&self) -> Vec<ReportCollection>;

    /// Fire-and-forget write of one physical report
    async fn send_report(&self, report_id: u8, data: Vec<u8>) -> Result<()>;
}

/// Diagnostic snapshot of one managed device
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub product_name: String,
    pub opened: bool,
    /// Input signals the descriptor declared
    pub inputs: Vec<InputSignal>,
    /// Output signals the descriptor declared
    pub outputs: Vec<OutputSignal>,
}

/// Telephony signal codec for one physical device
pub struct DeviceManager {
    handle: Arc<dyn DeviceHandle>,
    tables: Arc<SignalTables>,
    router: Arc<InputRouter>,
    output: OutputCache,
    config: ManagerConfig,
}

impl DeviceManager {
    /// Build the manager for an already-selected device.
    ///
    /// Parses the descriptor exactly once; a device without collections or
    /// without a telephony collection cannot be managed and fails here.
    pub fn new(handle: Arc<dyn DeviceHandle>, config: ManagerConfig) -> Result<Self> {
        let collections = handle.collections();
        let tables = Arc::new(SignalTables::parse(&collections)?);

        info!(
            product = %handle.product_name(),
            inputs = tables.inputs().count(),
            outputs = tables.outputs().count(),
            "telephony device manager created"
        );

        Ok(Self {
            router: Arc::new(InputRouter::new(tables.clone())),
            output: OutputCache::new(tables.clone()),
            tables,
            handle,
            config,
        })
    }

    /// Build from the outcome of external device selection.
    ///
    /// `None` means no device was selected, which is a valid empty result
    /// rather than an error.
    pub fn create(
        handle: Option<Arc<dyn DeviceHandle>>,
        config: ManagerConfig,
    ) -> Result<Option<Self>> {
        match handle {
            Some(handle) => Self::new(handle, config).map(Some),
            None => {
                debug!("no device selected");
                Ok(None)
            }
        }
    }

    pub fn product_name(&self) -> String {
        self.handle.product_name()
    }

    pub fn is_opened(&self) -> bool {
        self.handle.is_opened()
    }

    /// Open the device. Idempotent; an already-open device is left alone.
    pub async fn open(&self) -> Result<()> {
        if self.handle.is_opened() {
            trace!("device already open");
            return Ok(());
        }
        self.handle.open().await
    }

    /// Close the device. Idempotent. Cached output state survives the
    /// close; only its validity is gated (see [`DeviceManager::get_state`]).
    pub async fn close(&self) -> Result<()> {
        if !self.handle.is_opened() {
            trace!("device already closed");
            return Ok(());
        }
        self.handle.close().await
    }

    pub fn support_input(&self, signal: InputSignal) -> bool {
        self.tables.input(signal).is_some()
    }

    pub fn support_output(&self, signal: OutputSignal) -> bool {
        self.tables.output(signal).is_some()
    }

    /// Control behavior of an input signal, or `None` when the descriptor
    /// did not declare it
    pub fn control_category(&self, signal: InputSignal) -> Option<ControlCategory> {
        self.tables.input(signal).map(|entry| entry.category)
    }

    /// Register a subscriber for decoded values of `signal`
    pub fn subscribe(
        &self,
        signal: InputSignal,
        callback: impl Fn(bool, ControlCategory) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.router.subscribe(signal, callback)
    }

    pub fn unsubscribe(&self, signal: InputSignal, id: SubscriptionId) {
        self.router.unsubscribe(signal, id)
    }

    /// Apply boolean writes to output signals.
    ///
    /// The state cache is always updated; physical reports are only issued
    /// while the device is open (a closed device makes this a cache-only
    /// no-op, not an error). One report is sent per distinct report id
    /// touched, carrying the merged state of every signal in that report.
    pub async fn send(&self, writes: &[(OutputSignal, bool)]) -> Result<()> {
        let reports = self.output.apply(writes)?;
        if !self.handle.is_opened() {
            debug!("device not open, output state cached only");
            return Ok(());
        }
        for (report_id, data) in reports {
            trace!(report_id, bytes = ?data, "sending output report");
            self.handle.send_report(report_id, data).await?;
        }
        Ok(())
    }

    /// Last state applied to `signal`, or `None` while the device is not
    /// open (the cache may be stale relative to the hardware)
    pub fn get_state(&self, signal: OutputSignal) -> Option<bool> {
        if !self.handle.is_opened() {
            return None;
        }
        Some(self.output.state(signal))
    }

    /// Decode one raw inbound report and dispatch to subscribers.
    ///
    /// Synchronous; invoked by the surrounding runtime for every report
    /// the device delivers.
    pub fn on_input_report(&self, event: &InputReportEvent) {
        let matched = self.router.dispatch(event.report_id, &event.data);
        if matched == 0 {
            if self.config.warn_unmatched_reports {
                warn!(report_id = event.report_id, "input report matched no known signal");
            } else {
                debug!(report_id = event.report_id, "input report matched no known signal");
            }
        }
    }

    /// Build the inbound event channel, sized from configuration
    pub fn input_channel(
        &self,
    ) -> (
        mpsc::Sender<InputReportEvent>,
        mpsc::Receiver<InputReportEvent>,
    ) {
        mpsc::channel(self.config.input_queue_capacity)
    }

    /// Pump inbound events until the channel closes, dispatching each one
    pub async fn run_input_loop(&self, mut rx: mpsc::Receiver<InputReportEvent>) {
        while let Some(event) = rx.recv().await {
            self.on_input_report(&event);
        }
        debug!("input event channel closed, dispatch loop stopped");
    }

    /// Diagnostic snapshot of the managed device
    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            product_name: self.handle.product_name(),
            opened: self.handle.is_opened(),
            inputs: self.tables.inputs().map(|(signal, _)| signal).collect(),
            outputs: self.tables.outputs().map(|(signal, _)| signal).collect(),
        }
    }
}
