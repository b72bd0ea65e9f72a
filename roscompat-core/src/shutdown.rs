//! Stopping the event loop.
//!
//! `spin` is the only blocking operation of a node and it only returns once
//! shutdown has been requested, either by a signal or through a
//! [`ShutdownHandle`]. The handle is the one piece of a node that may cross
//! threads.

use crate::error::Result;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared shutdown flag of a runtime.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// A handle with shutdown not requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. `spin` returns at its next wake-up.
    pub fn shutdown(&self) {
        tracing::debug!("shutdown requested");
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request shutdown on SIGINT and SIGTERM.
    pub fn install_signal_handlers(&self) -> Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.flag))?;
        }
        Ok(())
    }
}
