// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging setup for the vstorage workspace
//!
//! Every crate logs through the macros exported here, which forward to `emit`.
//! Nothing is written until [`init`] is called, and then only at or above the
//! level named by the `VSTORAGE_LOG` environment variable:
//!
//! - `VSTORAGE_LOG=off` (default) - no logs
//! - `VSTORAGE_LOG=error` / `warn` - problems only
//! - `VSTORAGE_LOG=info` - basic operation logs
//! - `VSTORAGE_LOG=debug` - every structural change in the virtual filesystem

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable selecting the minimum log level.
pub const LOG_ENV: &str = "VSTORAGE_LOG";

static INIT: Once = Once::new();

/// Parsed value of [`LOG_ENV`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSetting {
    Off,
    Level(emit::Level),
    /// The variable held something unrecognized; `info` is used instead.
    Unknown,
}

/// Interprets a `VSTORAGE_LOG` value. Matching ignores ASCII case.
#[must_use]
pub fn parse_setting(value: &str) -> LogSetting {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => LogSetting::Off,
        "error" => LogSetting::Level(emit::Level::Error),
        "warn" => LogSetting::Level(emit::Level::Warn),
        "info" => LogSetting::Level(emit::Level::Info),
        "debug" => LogSetting::Level(emit::Level::Debug),
        _ => LogSetting::Unknown,
    }
}

/// Initialize diagnostics based on the `VSTORAGE_LOG` environment variable
///
/// Safe to call any number of times; only the first call has an effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_default();

        let level = match parse_setting(&raw) {
            LogSetting::Off => return,
            LogSetting::Level(level) => level,
            LogSetting::Unknown => {
                // Bootstrap warning: the emitter does not exist yet.
                eprintln!("Warning: Unknown {LOG_ENV} value '{raw}', using 'info'");
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime must outlive every caller; it is never torn down.
        std::mem::forget(rt);
    });
}

/// Log basic operations
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable problems
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Log basic operations (folder created, file opened, ...)
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (node ids, re-registrations, stream lifecycle)
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log conditions that don't prevent operation but should be noted
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that prevent an operation from completing
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
