//! Logging integration using tracing.
//!
//! Both backends log through `tracing`. This module installs the subscriber
//! once per process and bridges `log` crate calls into it.
//!
//! # Example
//!
//! ```ignore
//! use roscompat_core::logger::init_ros_logging;
//! use tracing::{info, warn};
//!
//! // Initialize logging (call once at startup)
//! init_ros_logging("detectnet");
//!
//! info!("Node started");
//! warn!("Something unexpected");
//!
//! // Or use log crate (also works)
//! log::info!("This also works!");
//! ```

use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOGGER_NAME: OnceLock<String> = OnceLock::new();

/// Initialize logging for the node `name`.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Calling it again
/// is a no-op.
pub fn init_ros_logging(name: &str) {
    init_ros_logging_with_level(name, None);
}

/// Initialize logging with a default level taken from the command line
/// (`--log-level` or `__log`). `RUST_LOG` still wins when it is set.
pub fn init_ros_logging_with_level(name: &str, level: Option<&str>) {
    let mut first = false;
    LOGGER_NAME.get_or_init(|| {
        first = true;
        install(level.unwrap_or("info"));
        name.to_string()
    });

    if first {
        tracing::debug!(node = name, "logging initialized");
    } else if logger_name() != Some(name) {
        tracing::trace!(node = name, "logging already initialized, ignored");
    }
}

/// Name of the node logging was initialized for.
pub fn logger_name() -> Option<&'static str> {
    LOGGER_NAME.get().map(String::as_str)
}

fn install(default_level: &str) {
    // Set up log -> tracing bridge
    tracing_log::LogTracer::init().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, trace, warn};
