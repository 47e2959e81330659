//! Integration tests for agentcfg.

mod agent;
mod binding;
mod dump;
mod layered;
mod scope;

/// Strip ANSI escapes so colored output can be compared as plain text.
pub fn strip_ansi(s: &str) -> String {
    String::from_utf8(strip_ansi_escapes::strip(s.as_bytes())).unwrap()
}

/// Snapshot the `Display` of an error (or anything else), without colors.
#[macro_export]
macro_rules! assert_diag_snapshot {
    ($value:expr, @$snapshot:literal) => {
        insta::assert_snapshot!($crate::strip_ansi(&$value.to_string()), @$snapshot)
    };
}
