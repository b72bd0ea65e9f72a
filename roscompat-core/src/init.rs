//! Bootstrap options and the process-wide initialization guard.

use crate::{
    error::{Error, Result},
    status::DEFAULT_STATUS_POLL_PERIOD,
};
use parking_lot::{Mutex, const_mutex};
use std::time::Duration;

/// Name of the node that owns the process, once bootstrapped.
static PROCESS_NODE: Mutex<Option<String>> = const_mutex(None);

/// Options accepted by `Runtime::init_with_options` in both backends.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Sampling period of the emulated subscriber-connect notification.
    /// Backends with a native notification ignore it.
    pub status_poll_period: Duration,

    /// Stop `spin` on SIGINT/SIGTERM.
    pub install_signal_handlers: bool,

    /// Install the tracing subscriber, using the log level found in the
    /// arguments.
    pub init_logging: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            status_poll_period: DEFAULT_STATUS_POLL_PERIOD,
            install_signal_handlers: false,
            init_logging: false,
        }
    }
}

impl InitOptions {
    /// Options used by the process-wide `init`.
    pub fn process() -> Self {
        Self {
            install_signal_handlers: true,
            init_logging: true,
            ..Self::default()
        }
    }

    /// Override the status poll period.
    pub fn with_status_poll_period(mut self, period: Duration) -> Self {
        self.status_poll_period = period;
        self
    }
}

/// Claim the process for `node_name`.
///
/// Only one claim can be held at a time. The claim is released when the
/// returned [`ProcessClaim`] is dropped, unless it is kept with
/// [`ProcessClaim::keep`]; after that every call fails with
/// [`Error::AlreadyInit`].
pub fn claim_process(node_name: &str) -> Result<ProcessClaim> {
    let mut owner = PROCESS_NODE.lock();
    if let Some(existing) = owner.as_deref() {
        tracing::error!(
            existing,
            requested = node_name,
            "process already initialized"
        );
        return Err(Error::AlreadyInit);
    }
    *owner = Some(node_name.to_string());
    Ok(ProcessClaim { kept: false })
}

/// A pending claim on the process.
#[must_use = "dropping the claim releases the process"]
#[derive(Debug)]
pub struct ProcessClaim {
    kept: bool,
}

impl ProcessClaim {
    /// Keep the process claimed for good.
    pub fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for ProcessClaim {
    fn drop(&mut self) {
        if !self.kept {
            *PROCESS_NODE.lock() = None;
        }
    }
}

/// Name of the node owning the process, if any.
pub fn process_node() -> Option<String> {
    PROCESS_NODE.lock().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once() {
        let failed = claim_process("failed").unwrap();
        assert!(matches!(claim_process("other"), Err(Error::AlreadyInit)));
        drop(failed);
        assert_eq!(process_node(), None);

        claim_process("first").unwrap().keep();
        assert!(matches!(claim_process("second"), Err(Error::AlreadyInit)));
        assert_eq!(process_node().as_deref(), Some("first"));
    }
}
