//! Redaction wrapper for personal data that must not reach the logs
//!
//! User emails are passed to `tracing` only as `Sensitive<&str>`, so both
//! `?value` and `%value` field captures print a redacted form.

use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Wrapper whose `Debug` and `Display` never show the inner value
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the real value
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
