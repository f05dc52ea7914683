//! SIGINT/SIGTERM capture.
//!
//! The handler only raises a flag. Keeping the process alive lets scratch
//! files be wiped by their owners; the workflow polls the flag at the points
//! where abandoning an entry is safe.

use crate::errors::{AppError, AppResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Shared flag raised when the process receives SIGINT or SIGTERM.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Registers the process-wide handler and returns the flag it raises.
    ///
    /// Registration can only happen once per process; if it fails the returned
    /// flag is simply never raised.
    pub fn install() -> Self {
        let flag = Self::default();
        let raised = Arc::clone(&flag.raised);
        if let Err(e) = ctrlc::set_handler(move || raised.store(true, Ordering::SeqCst)) {
            warn!("Could not install interrupt handler: {}", e);
        }
        flag
    }

    /// A flag no signal handler is attached to.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Raises the flag by hand.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Whether an interrupt arrived.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Fails with `AppError::Interrupted` once an interrupt arrived.
    pub fn check(&self) -> AppResult<()> {
        if self.is_raised() {
            Err(AppError::Interrupted)
        } else {
            Ok(())
        }
    }
}
