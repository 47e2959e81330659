#![allow(unused_imports)]
#![allow(unused_macros)]

// Zero-cost tracing macros for agentcfg
//
// These macros forward to tracing when the `tracing` feature is enabled,
// and compile to nothing when disabled.

// -----------------------------------------------------------------------------
// trace! - Very verbose: per-option coercion, per-key layer work
// -----------------------------------------------------------------------------

#[cfg(any(feature = "tracing", test))]
macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) }
}

#[cfg(not(any(feature = "tracing", test)))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

// -----------------------------------------------------------------------------
// debug! - Intermediate values, decision points, useful for debugging
// -----------------------------------------------------------------------------

#[cfg(any(feature = "tracing", test))]
macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) }
}

#[cfg(not(any(feature = "tracing", test)))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

// -----------------------------------------------------------------------------
// info! - Startup status, configuration dumps requested by the user
// -----------------------------------------------------------------------------

#[cfg(any(feature = "tracing", test))]
macro_rules! info {
    ($($arg:tt)*) => { ::tracing::info!($($arg)*) }
}

#[cfg(not(any(feature = "tracing", test)))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

// -----------------------------------------------------------------------------
// warning! - Suspicious configuration, isolated failures
//
// Not named `warn`: that name clashes with the built-in lint attribute.
// -----------------------------------------------------------------------------

#[cfg(any(feature = "tracing", test))]
macro_rules! warning {
    ($($arg:tt)*) => { ::tracing::warn!($($arg)*) }
}

#[cfg(not(any(feature = "tracing", test)))]
macro_rules! warning {
    ($($arg:tt)*) => {};
}

// -----------------------------------------------------------------------------
// Make macros available throughout the crate
// -----------------------------------------------------------------------------

pub(crate) use debug;
pub(crate) use info;
pub(crate) use trace;
pub(crate) use warning;
