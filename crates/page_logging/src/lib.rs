#![deny(missing_docs)]
//! Shared logging utilities for the portfolio workspace.
//!
//! This crate provides the `page_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every record is
//! prefixed with the current page-load number so that interleaved loads in
//! one log file can be told apart.

use std::cell::Cell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Thread-local storage for the current page-load number.
    static PAGE_LOAD: Cell<u64> = const { Cell::new(0) };
}

/// Sets the page-load number for the current thread.
/// The controller calls this once when a new page load starts.
pub fn set_page_load(load: u64) {
    PAGE_LOAD.with(|v| v.set(load));
}

/// Retrieves the page-load number for the current thread.
/// Returns 0 outside of any page load.
pub fn page_load() -> u64 {
    PAGE_LOAD.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! page_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[load {}] {}", $crate::page_load(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! page_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[load {}] {}", $crate::page_load(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! page_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("[load {}] {}", $crate::page_load(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! page_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[load {}] {}", $crate::page_load(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! page_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("[load {}] {}", $crate::page_load(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{page_load, set_page_load};

    #[test]
    fn page_load_is_per_thread() {
        set_page_load(3);
        assert_eq!(page_load(), 3);
        let other = std::thread::spawn(page_load).join().unwrap();
        assert_eq!(other, 0);
    }
}
