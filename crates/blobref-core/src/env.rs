//! Environment lookup capability for `env://` references.
//!
//! The resolver only ever reads through this trait, so tests can hand it a
//! plain map instead of mutating the real process environment.

use std::collections::HashMap;
use std::ffi::OsString;

/// Read-only access to a set of environment variables.
pub trait EnvLookup {
    /// Returns the raw value of `name`, or `None` if it is not set.
    fn lookup(&self, name: &str) -> Option<OsString>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<OsString> {
        // Empty or `=`-containing names make var_os panic on some platforms.
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return None;
        }
        std::env::var_os(name)
    }
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<OsString> {
        self.get(name).map(OsString::from)
    }
}

impl<T: EnvLookup + ?Sized> EnvLookup for &T {
    fn lookup(&self, name: &str) -> Option<OsString> {
        (**self).lookup(name)
    }
}
