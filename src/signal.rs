//! Signal handling for graceful shutdown.
//!
//! Centralized Ctrl+C handling built on an `AtomicBool` flag shared across
//! threads. When the flag is set, the walker stops yielding entries and
//! the hashing and relocation stages stop dispatching new jobs; in-flight
//! file reads and moves are allowed to finish so no partial destination is
//! ever left behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shutdown coordinator for graceful application termination.
///
/// `ShutdownHandler` is `Send` and `Sync`; the underlying flag uses atomic
/// operations for thread-safe access.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a new handler with the flag initially unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the flag for passing to worker stages.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        self.flag.clone()
    }
}

/// Install a Ctrl+C handler wired to a new [`ShutdownHandler`].
///
/// # Errors
///
/// Returns `ctrlc::Error` if the OS signal handler cannot be installed.
pub fn install_handler() -> Result<ShutdownHandler, ctrlc::Error> {
    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            // Second Ctrl+C: the user really means it.
            std::process::exit(crate::error::ExitCode::Interrupted.as_i32());
        }
        eprintln!("Interrupted. Letting in-flight operations finish...");
    })?;

    Ok(handler)
}
