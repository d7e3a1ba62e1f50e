//! Verbose logging for debugging larder operations.
//!
//! Call `set_verbose(true)` (or export `LARDER_VERBOSE=1`) and use the
//! `verbose!()` macro to print diagnostics to stderr.

use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Environment variable that turns verbose output on without a CLI flag
pub const VERBOSE_ENV_VAR: &str = "LARDER_VERBOSE";

/// Enable or disable verbose logging
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::SeqCst);
}

/// Enable verbose logging if `LARDER_VERBOSE` is set to a truthy value
pub fn init_from_env() {
    if let Ok(value) = std::env::var(VERBOSE_ENV_VAR) {
        let value = value.trim().to_lowercase();
        if matches!(value.as_str(), "1" | "true" | "yes" | "on") {
            set_verbose(true);
        }
    }
}

/// Check if verbose logging is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Log a formatted message if verbose mode is enabled
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::verbose::is_verbose() {
            eprintln!("[verbose] {}", format!($($arg)*));
        }
    };
}
