//! Logging initialization for binaries and test harnesses
//!
//! The library itself only emits `tracing` events; callers that want them
//! on a console opt in here.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `level` is the default filter directive for this crate (e.g. "info",
/// "debug"); the `RUST_LOG` environment variable takes priority when set.
pub fn init(level: &str) {
    let filter = format!("hid_telephony={level}");
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        eprintln!("failed to initialize tracing: {err}");
    }
}
