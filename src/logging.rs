//! Logging macros shared by the router internals.
//!
//! Every macro forwards to whichever backend feature is enabled:
//!
//! - `log` (default) - the `log` crate facade
//! - `tracing` - the `tracing` crate
//!
//! With neither feature enabled the macros expand to nothing. Enable only one
//! backend; enabling both emits every record twice.
//!
//! ```ignore
//! use history_router::{debug_log, trace_log};
//!
//! debug_log!("dispatching {} ({})", path, trigger);
//! trace_log!("running hook {}", index);
//! ```

/// Forwards a record at the given level to the enabled backend.
#[doc(hidden)]
#[macro_export]
macro_rules! __route_log {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            ::tracing::$level!($($arg)*);
        }
        #[cfg(feature = "log")]
        {
            ::log::$level!($($arg)*);
        }
    }};
}

/// Trace-level record: per-hook steps and cache lookups.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        $crate::__route_log!(trace, $($arg)*)
    };
}

/// Debug-level record: one per dispatch and per registration.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::__route_log!(debug, $($arg)*)
    };
}

/// Info-level record.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        $crate::__route_log!(info, $($arg)*)
    };
}

/// Warn-level record: misuse the router tolerates, such as a repeated `start`.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::__route_log!(warn, $($arg)*)
    };
}

/// Error-level record.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        $crate::__route_log!(error, $($arg)*)
    };
}
