// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compile-time configurable logging.
//!
//! Internal macros with three severity levels:
//! - `trace!()` - Per-field decisions (skipped copies, shadowed names)
//! - `debug!()` - Type compilation and instantiation
//! - `warn!()` - Caller input that was ignored
//!
//! With the `logging` feature (default) every macro forwards to the `log`
//! facade under the `dynrecord` target, so the host application picks the
//! backend. Without it the macros expand to an unevaluated `format_args!`
//! and cost nothing at runtime.
//!
//! The module is declared first with `#[macro_use]`, so the macros are in
//! scope for every other module of the crate.

#[cfg(feature = "logging")]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::log::trace!(target: "dynrecord", $($arg)*)
    };
}

#[cfg(feature = "logging")]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::log::debug!(target: "dynrecord", $($arg)*)
    };
}

#[cfg(feature = "logging")]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::log::warn!(target: "dynrecord", $($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! trace {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(not(feature = "logging"))]
macro_rules! debug {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(not(feature = "logging"))]
macro_rules! warn {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

